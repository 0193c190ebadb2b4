//! Normalised Fourier-space matter profile assembly.

use super::{HaloIngredients, HaloModel};
use crate::domain::{HmError, HmResult, Ingredients};
use ndarray::Array2;
use std::fmt::{Display, Formatter};

/// Mass-weighted, density-normalised Fourier tracer profile handed to the
/// bispectrum engine under the matter tracer key.
#[derive(Debug, Clone, PartialEq)]
pub struct MatterProfile {
    ks: Vec<f64>,
    ms: Vec<f64>,
    window: Array2<f64>,
    amplitude: Vec<f64>,
    normalisation: f64,
    mass_tracer: bool,
}

impl MatterProfile {
    pub fn ks(&self) -> &[f64] {
        &self.ks
    }

    pub fn ms(&self) -> &[f64] {
        &self.ms
    }

    /// Window matrix U(k, M), wavenumbers along rows.
    pub fn window(&self) -> &Array2<f64> {
        &self.window
    }

    /// Per-mass profile amplitude; the halo mass itself for the matter tracer.
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    /// Comoving mean matter density dividing the amplitudes.
    pub fn normalisation(&self) -> f64 {
        self.normalisation
    }

    pub fn is_mass_tracer(&self) -> bool {
        self.mass_tracer
    }
}

impl Display for MatterProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "matter profile: {} wavenumbers x {} masses, normalisation={:.4e}, mass_tracer={}",
            self.ks.len(),
            self.ms.len(),
            self.normalisation,
            self.mass_tracer
        )
    }
}

/// Builds the matter tracer profile.
///
/// The collaborator concentration is rescaled by `b / 4` and divided by the
/// peak-height bloating factor nu^eta before the window function is
/// evaluated; `eta = 0` leaves the concentrations unbloated.
pub fn build_matter_profile(
    ingredients_backend: &impl HaloIngredients,
    model: &HaloModel,
    ks: &[f64],
    ms: &[f64],
    sigmas: &[f64],
    ingredients: &Ingredients,
    eta: f64,
    b: f64,
) -> HmResult<MatterProfile> {
    if sigmas.len() != ms.len() {
        return Err(HmError::LengthMismatch {
            context: "variance grid",
            expected: ms.len(),
            actual: sigmas.len(),
        });
    }

    let nus = model.peak_heights(sigmas);
    let raw = ingredients_backend
        .concentration(
            ms,
            model.redshift(),
            &ingredients.concentration,
            &ingredients.halo_definition,
        )
        .map_err(|source| HmError::backend("concentration", source))?;
    if raw.len() != ms.len() {
        return Err(HmError::LengthMismatch {
            context: "concentration grid",
            expected: ms.len(),
            actual: raw.len(),
        });
    }

    let concentrations: Vec<f64> = raw
        .iter()
        .zip(&nus)
        .map(|(&c, &nu)| b / 4.0 * c / nu.powf(eta))
        .collect();
    let virial_radii = model.virial_radii(ms);

    let window = ingredients_backend
        .window_function(ks, &virial_radii, &concentrations, &ingredients.profile)
        .map_err(|source| HmError::backend("window function", source))?;
    if window.dim() != (ks.len(), ms.len()) {
        return Err(HmError::LengthMismatch {
            context: "window matrix",
            expected: ks.len() * ms.len(),
            actual: window.len(),
        });
    }

    Ok(MatterProfile {
        ks: ks.to_vec(),
        ms: ms.to_vec(),
        window,
        amplitude: ms.to_vec(),
        normalisation: model.mean_density(),
        mass_tracer: true,
    })
}
