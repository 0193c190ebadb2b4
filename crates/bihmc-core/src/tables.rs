//! Table-backed collaborator implementations.
//!
//! Stand-ins for the external halo-model and Boltzmann libraries: every
//! physics quantity is read from a precomputed table. This is how the CLI and
//! the regression tests drive the full pipeline without those libraries.

use crate::bispectrum::{BispectrumEngine, BispectrumTerms, EngineRequest};
use crate::domain::{BackendError, BackendResult, Cosmology};
use crate::halo::HaloIngredients;
use crate::numerics::interpolate_linear;
use crate::power::{CosmologyBackend, SigmaSource};
use ndarray::Array2;
use serde::Deserialize;

const REDSHIFT_TOLERANCE: f64 = 1.0e-6;
const SCALE_FACTOR_TOLERANCE: f64 = 1.0e-6;

/// sigma(R) rows tabulated per redshift, radii in Mpc/h.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SigmaTable {
    pub redshifts: Vec<f64>,
    pub radii: Vec<f64>,
    /// One row of sigma(R) per tabulated redshift.
    pub values: Vec<Vec<f64>>,
}

impl SigmaTable {
    fn row(&self, z: f64) -> BackendResult<&[f64]> {
        let index = self
            .redshifts
            .iter()
            .position(|&tabulated| (tabulated - z).abs() <= REDSHIFT_TOLERANCE)
            .ok_or_else(|| BackendError::Evaluation {
                context: "sigma(R) table",
                message: format!("no row tabulated at z={z}"),
            })?;
        let row = self
            .values
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| BackendError::Evaluation {
                context: "sigma(R) table",
                message: format!("missing value row for z={z}"),
            })?;
        if row.len() != self.radii.len() {
            return Err(BackendError::Evaluation {
                context: "sigma(R) table",
                message: format!(
                    "row at z={z} has {} values for {} radii",
                    row.len(),
                    self.radii.len()
                ),
            });
        }
        Ok(row)
    }
}

impl SigmaSource for SigmaTable {
    /// Linear interpolation in ln R over the selected redshift row.
    fn sigma_r(&self, radii: &[f64], z: f64) -> BackendResult<Vec<f64>> {
        let row = self.row(z)?;
        let ln_grid: Vec<f64> = self.radii.iter().map(|&radius| radius.ln()).collect();
        radii
            .iter()
            .map(|&radius| {
                interpolate_linear(radius.ln(), &ln_grid, row).ok_or_else(|| {
                    BackendError::Evaluation {
                        context: "sigma(R) table",
                        message: format!("cannot interpolate sigma at R={radius}"),
                    }
                })
            })
            .collect()
    }
}

/// Concentration and window tables for one ingredient selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HaloTables {
    pub concentration: ConcentrationTable,
    pub window: WindowTable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConcentrationTable {
    pub method: String,
    #[serde(rename = "haloDefinition")]
    pub halo_definition: String,
    pub masses: Vec<f64>,
    pub concentrations: Vec<f64>,
}

/// Row-major U(k, M) samples on the producing run's wavenumber grid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowTable {
    pub profile: String,
    pub values: Vec<Vec<f64>>,
}

impl HaloIngredients for HaloTables {
    fn concentration(
        &self,
        ms: &[f64],
        _z: f64,
        method: &str,
        halo_definition: &str,
    ) -> BackendResult<Vec<f64>> {
        let table = &self.concentration;
        if method != table.method {
            return Err(BackendError::UnknownModel {
                kind: "concentration",
                name: method.to_string(),
            });
        }
        if halo_definition != table.halo_definition {
            return Err(BackendError::UnknownModel {
                kind: "halo definition",
                name: halo_definition.to_string(),
            });
        }

        let ln_masses: Vec<f64> = table.masses.iter().map(|&mass| mass.ln()).collect();
        ms.iter()
            .map(|&mass| {
                interpolate_linear(mass.ln(), &ln_masses, &table.concentrations).ok_or_else(
                    || BackendError::Evaluation {
                        context: "concentration table",
                        message: format!("cannot interpolate c(M) at M={mass}"),
                    },
                )
            })
            .collect()
    }

    fn window_function(
        &self,
        ks: &[f64],
        _virial_radii: &[f64],
        concentrations: &[f64],
        profile: &str,
    ) -> BackendResult<Array2<f64>> {
        if profile != self.window.profile {
            return Err(BackendError::UnknownModel {
                kind: "profile",
                name: profile.to_string(),
            });
        }
        if self.window.values.len() != ks.len() {
            return Err(BackendError::Evaluation {
                context: "window table",
                message: format!(
                    "table has {} wavenumber rows, run uses {}",
                    self.window.values.len(),
                    ks.len()
                ),
            });
        }

        let mut matrix = Array2::zeros((ks.len(), concentrations.len()));
        for (row_index, row) in self.window.values.iter().enumerate() {
            if row.len() != concentrations.len() {
                return Err(BackendError::Evaluation {
                    context: "window table",
                    message: format!(
                        "row {row_index} has {} values for {} masses",
                        row.len(),
                        concentrations.len()
                    ),
                });
            }
            for (column_index, &value) in row.iter().enumerate() {
                matrix[(row_index, column_index)] = value;
            }
        }
        Ok(matrix)
    }
}

/// Precomputed engine contributions for one tracer channel.
///
/// The grids, suppression parameters and flags of the producing run are baked
/// into the values, so the request is accepted as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContributionsTable {
    pub channel: String,
    #[serde(rename = "threeHalo")]
    pub three_halo: Vec<f64>,
    #[serde(rename = "twoHalo")]
    pub two_halo: Vec<f64>,
    #[serde(rename = "oneHalo")]
    pub one_halo: Vec<f64>,
    #[serde(default)]
    pub sum: Option<Vec<f64>>,
}

impl BispectrumEngine for ContributionsTable {
    fn bispectrum(&self, _request: &EngineRequest<'_>) -> BackendResult<BispectrumTerms> {
        let len = self.three_halo.len();
        if self.two_halo.len() != len || self.one_halo.len() != len {
            return Err(BackendError::Evaluation {
                context: "contributions table",
                message: format!(
                    "terms differ in length: 3h={}, 2h={}, 1h={}",
                    len,
                    self.two_halo.len(),
                    self.one_halo.len()
                ),
            });
        }

        let sum = self.sum.clone().unwrap_or_else(|| {
            self.one_halo
                .iter()
                .zip(&self.two_halo)
                .zip(&self.three_halo)
                .map(|((&one, &two), &three)| one + two + three)
                .collect()
        });

        let mut terms = BispectrumTerms::default();
        terms
            .three_halo
            .insert(self.channel.clone(), self.three_halo.clone());
        terms
            .two_halo
            .insert(self.channel.clone(), self.two_halo.clone());
        terms
            .one_halo
            .insert(self.channel.clone(), self.one_halo.clone());
        terms.sum.insert(self.channel.clone(), sum);
        Ok(terms)
    }
}

/// One-scale-factor Boltzmann tables in the backend's Mpc units.
///
/// Spectra are interpolated log-log, so tabulated powers must be positive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerTables {
    pub cosmology: Cosmology,
    #[serde(rename = "scaleFactor")]
    pub scale_factor: f64,
    /// Wavenumbers in 1/Mpc.
    pub ks: Vec<f64>,
    #[serde(rename = "pkLin")]
    pub pk_lin: Vec<f64>,
    #[serde(rename = "pkNoWiggle")]
    pub pk_no_wiggle: Vec<f64>,
    /// Radii in Mpc.
    #[serde(rename = "sigmaRadii")]
    pub sigma_radii: Vec<f64>,
    #[serde(rename = "sigmaValues")]
    pub sigma_values: Vec<f64>,
}

impl PowerTables {
    fn check_scale_factor(&self, a: f64) -> BackendResult<()> {
        if (a - self.scale_factor).abs() > SCALE_FACTOR_TOLERANCE {
            return Err(BackendError::Evaluation {
                context: "power tables",
                message: format!(
                    "tables evaluated at a={}, requested a={a}",
                    self.scale_factor
                ),
            });
        }
        Ok(())
    }

    fn interpolate_power(&self, pk: &[f64], ks: &[f64]) -> BackendResult<Vec<f64>> {
        let ln_grid: Vec<f64> = self.ks.iter().map(|&k| k.ln()).collect();
        let ln_pk: Vec<f64> = pk.iter().map(|&p| p.ln()).collect();
        ks.iter()
            .map(|&k| {
                interpolate_linear(k.ln(), &ln_grid, &ln_pk)
                    .map(f64::exp)
                    .ok_or_else(|| BackendError::Evaluation {
                        context: "power tables",
                        message: format!("cannot interpolate P(k) at k={k}"),
                    })
            })
            .collect()
    }
}

impl CosmologyBackend for PowerTables {
    fn cosmology(&self) -> &Cosmology {
        &self.cosmology
    }

    fn sigma_r(&self, radii_mpc: &[f64], scale_factor: f64) -> BackendResult<Vec<f64>> {
        self.check_scale_factor(scale_factor)?;
        let ln_grid: Vec<f64> = self.sigma_radii.iter().map(|&radius| radius.ln()).collect();
        radii_mpc
            .iter()
            .map(|&radius| {
                interpolate_linear(radius.ln(), &ln_grid, &self.sigma_values).ok_or_else(|| {
                    BackendError::Evaluation {
                        context: "power tables",
                        message: format!("cannot interpolate sigma at R={radius}"),
                    }
                })
            })
            .collect()
    }

    fn linear_power(&self, ks_per_mpc: &[f64], scale_factor: f64) -> BackendResult<Vec<f64>> {
        self.check_scale_factor(scale_factor)?;
        self.interpolate_power(&self.pk_lin, ks_per_mpc)
    }

    fn linear_power_no_wiggle(
        &self,
        ks_per_mpc: &[f64],
        scale_factor: f64,
    ) -> BackendResult<Vec<f64>> {
        self.check_scale_factor(scale_factor)?;
        self.interpolate_power(&self.pk_no_wiggle, ks_per_mpc)
    }
}
