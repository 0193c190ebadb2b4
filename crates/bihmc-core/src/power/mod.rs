//! Variance and linear-power sources for the two pipeline variants.

pub mod dewiggle;

pub use dewiggle::{damping_envelope, dewiggle_linear_power, velocity_dispersion_sq, DewiggleError};

use crate::domain::{BackendResult, Cosmology};

/// Scale factor corresponding to redshift `z`.
pub fn scale_factor(z: f64) -> f64 {
    1.0 / (1.0 + z)
}

/// sigma(R) from an externally precomputed table (tabulated variant).
///
/// The redshift is resolved by value: requesting a redshift the table was not
/// built at is an error, never a silent first-row lookup.
pub trait SigmaSource {
    /// One variance value per radius, radii in Mpc/h.
    fn sigma_r(&self, radii: &[f64], z: f64) -> BackendResult<Vec<f64>>;
}

/// Cosmology collaborator for the Boltzmann-backend variant.
///
/// Wavenumbers are 1/Mpc, radii Mpc and powers Mpc^3 on this boundary; the
/// pipeline converts to and from h-units around every call.
pub trait CosmologyBackend {
    /// Parameters of the wrapped cosmology.
    fn cosmology(&self) -> &Cosmology;

    fn sigma_r(&self, radii_mpc: &[f64], scale_factor: f64) -> BackendResult<Vec<f64>>;

    fn linear_power(&self, ks_per_mpc: &[f64], scale_factor: f64) -> BackendResult<Vec<f64>>;

    /// Linear power of the matched no-wiggle cosmology: identical parameters,
    /// BAO-free transfer function.
    fn linear_power_no_wiggle(
        &self,
        ks_per_mpc: &[f64],
        scale_factor: f64,
    ) -> BackendResult<Vec<f64>>;
}

/// h/Mpc wavenumbers into the backend's 1/Mpc convention.
pub fn wavenumbers_per_mpc(ks: &[f64], h: f64) -> Vec<f64> {
    ks.iter().map(|&k| k * h).collect()
}

/// Mpc/h radii into the backend's Mpc convention.
pub fn radii_mpc(radii: &[f64], h: f64) -> Vec<f64> {
    radii.iter().map(|&r| r / h).collect()
}

/// Mpc^3 powers into the halo-model (Mpc/h)^3 convention.
pub fn power_h_units(pk: &[f64], h: f64) -> Vec<f64> {
    let h3 = h * h * h;
    pk.iter().map(|&p| p * h3).collect()
}

#[cfg(test)]
mod tests {
    use super::{power_h_units, radii_mpc, scale_factor, wavenumbers_per_mpc};

    #[test]
    fn scale_factor_inverts_one_plus_z() {
        assert_eq!(scale_factor(0.0), 1.0);
        assert!((scale_factor(1.0) - 0.5).abs() < 1.0e-12);
        assert!((scale_factor(3.0) - 0.25).abs() < 1.0e-12);
    }

    #[test]
    fn unit_conversions_round_trip_through_h() {
        let h = 0.7;
        let ks = [0.01, 0.1, 1.0];
        let per_mpc = wavenumbers_per_mpc(&ks, h);
        assert!((per_mpc[1] - 0.07).abs() < 1.0e-12);

        let radii = [8.0];
        assert!((radii_mpc(&radii, h)[0] - 8.0 / 0.7).abs() < 1.0e-12);

        let pk = [1000.0];
        assert!((power_h_units(&pk, h)[0] - 343.0).abs() < 1.0e-9);
    }
}
