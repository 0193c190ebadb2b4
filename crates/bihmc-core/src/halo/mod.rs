//! Halo-model setup and the halo-ingredient collaborator seam.

pub mod profile;

pub use profile::{build_matter_profile, MatterProfile};

use crate::common::constants::{DELTA_COLLAPSE, HALO_OVERDENSITY, RHO_CRITICAL};
use crate::domain::BackendResult;
use ndarray::Array2;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

/// Spherical-overdensity halo-model state for one cosmology and redshift.
///
/// Radius conversions and the peak height are closed-form; the mass function
/// named by `hmf` is only carried along for the engine, which owns that
/// physics.
#[derive(Debug, Clone, PartialEq)]
pub struct HaloModel {
    z: f64,
    omega_m: f64,
    hmf: String,
    dc: f64,
    dv: f64,
}

impl HaloModel {
    pub fn new(z: f64, omega_m: f64, hmf: impl Into<String>) -> Self {
        Self {
            z,
            omega_m,
            hmf: hmf.into(),
            dc: DELTA_COLLAPSE,
            dv: HALO_OVERDENSITY,
        }
    }

    pub fn redshift(&self) -> f64 {
        self.z
    }

    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    pub fn hmf_name(&self) -> &str {
        &self.hmf
    }

    /// Comoving mean matter density in (Msun/h) / (Mpc/h)^3.
    pub fn mean_density(&self) -> f64 {
        RHO_CRITICAL * self.omega_m
    }

    /// Lagrangian radius of a halo of mass `m`: the comoving radius enclosing
    /// `m` at the mean density.
    pub fn lagrangian_radius(&self, m: f64) -> f64 {
        (3.0 * m / (4.0 * PI * self.mean_density())).cbrt()
    }

    pub fn lagrangian_radii(&self, ms: &[f64]) -> Vec<f64> {
        ms.iter().map(|&m| self.lagrangian_radius(m)).collect()
    }

    /// Halo radius at the model's overdensity threshold.
    pub fn virial_radius(&self, m: f64) -> f64 {
        self.lagrangian_radius(m) / self.dv.cbrt()
    }

    pub fn virial_radii(&self, ms: &[f64]) -> Vec<f64> {
        ms.iter().map(|&m| self.virial_radius(m)).collect()
    }

    /// Peak height nu = dc / sigma(R_Lagrangian).
    pub fn peak_height(&self, sigma: f64) -> f64 {
        self.dc / sigma
    }

    pub fn peak_heights(&self, sigmas: &[f64]) -> Vec<f64> {
        sigmas.iter().map(|&sigma| self.peak_height(sigma)).collect()
    }
}

impl Display for HaloModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "halo model: hmf='{}', z={}, Omega_m={}, dc={}, Dv={}",
            self.hmf, self.z, self.omega_m, self.dc, self.dv
        )
    }
}

/// Halo-ingredient collaborator: concentration-mass relations and
/// Fourier-space window functions. Implementations own the halo physics;
/// this crate only orchestrates them.
pub trait HaloIngredients {
    /// Concentration c(M, z) per halo mass under the named relation and halo
    /// definition.
    fn concentration(
        &self,
        ms: &[f64],
        z: f64,
        method: &str,
        halo_definition: &str,
    ) -> BackendResult<Vec<f64>>;

    /// Normalised Fourier window U(k, M): one row per wavenumber, one column
    /// per halo mass.
    fn window_function(
        &self,
        ks: &[f64],
        virial_radii: &[f64],
        concentrations: &[f64],
        profile: &str,
    ) -> BackendResult<Array2<f64>>;
}
