//! BAO dewiggling of the linear power spectrum.
//!
//! The oscillatory residual against a no-wiggle template is damped by an
//! exponential envelope keyed to the bulk displacement scale, leaving the
//! low-k spectrum untouched.

use crate::numerics::{gaussian_filter_1d, trapezoid};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DewiggleError {
    #[error("dewiggling needs at least 2 wavenumber samples, got {actual}")]
    GridTooShort { actual: usize },
    #[error("wavenumber grid must be positive and strictly increasing at index {index}")]
    NonMonotonicGrid { index: usize },
    #[error("spectrum '{name}' has {actual} values for a {expected}-point wavenumber grid")]
    SpectrumLengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Index-space smoothing width derived from the log spacing of the first two
/// grid points. The grid is assumed uniform in log k.
fn smoothing_sigma(ks: &[f64]) -> f64 {
    let dlnk = (ks[1] / ks[0]).ln();
    0.25 / dlnk
}

/// Velocity-dispersion proxy sigma_v^2 = (1 / 6 pi^2) * integral of P(k) dk.
pub fn velocity_dispersion_sq(ks: &[f64], pk_lin: &[f64]) -> Result<f64, DewiggleError> {
    validate_grid(ks)?;
    validate_spectrum("linear", ks, pk_lin)?;
    let integral = trapezoid(ks, pk_lin).unwrap_or(0.0);
    Ok(integral / (6.0 * PI * PI))
}

/// Damping envelope exp(-k^2 sigma_v^2): unity at k = 0, decreasing in k.
pub fn damping_envelope(k: f64, sigma_v_sq: f64) -> f64 {
    (-k * k * sigma_v_sq).exp()
}

/// Replaces `pk_lin` by `pk_lin - (1 - f(k)) * pk_wiggle`.
///
/// The wiggle component is isolated by smoothing the linear/no-wiggle ratio
/// with a 1-D Gaussian of width 0.25/dlnk grid indices and multiplying back
/// by the no-wiggle template.
pub fn dewiggle_linear_power(
    ks: &[f64],
    pk_lin: &[f64],
    pk_no_wiggle: &[f64],
) -> Result<Vec<f64>, DewiggleError> {
    validate_grid(ks)?;
    validate_spectrum("linear", ks, pk_lin)?;
    validate_spectrum("no-wiggle", ks, pk_no_wiggle)?;

    let sigma = smoothing_sigma(ks);
    let ratio: Vec<f64> = pk_lin
        .iter()
        .zip(pk_no_wiggle)
        .map(|(&lin, &nw)| lin / nw)
        .collect();
    let smoothed_ratio = gaussian_filter_1d(&ratio, sigma);
    let pk_smooth: Vec<f64> = smoothed_ratio
        .iter()
        .zip(pk_no_wiggle)
        .map(|(&r, &nw)| r * nw)
        .collect();

    let sigma_v_sq = velocity_dispersion_sq(ks, pk_lin)?;

    Ok(ks
        .iter()
        .zip(pk_lin.iter().zip(&pk_smooth))
        .map(|(&k, (&lin, &smooth))| {
            let wiggle = lin - smooth;
            lin - (1.0 - damping_envelope(k, sigma_v_sq)) * wiggle
        })
        .collect())
}

fn validate_grid(ks: &[f64]) -> Result<(), DewiggleError> {
    if ks.len() < 2 {
        return Err(DewiggleError::GridTooShort { actual: ks.len() });
    }
    if ks[0] <= 0.0 {
        return Err(DewiggleError::NonMonotonicGrid { index: 0 });
    }
    for index in 1..ks.len() {
        if ks[index] <= ks[index - 1] {
            return Err(DewiggleError::NonMonotonicGrid { index });
        }
    }
    Ok(())
}

fn validate_spectrum(
    name: &'static str,
    ks: &[f64],
    pk: &[f64],
) -> Result<(), DewiggleError> {
    if pk.len() != ks.len() {
        return Err(DewiggleError::SpectrumLengthMismatch {
            name,
            expected: ks.len(),
            actual: pk.len(),
        });
    }
    Ok(())
}
