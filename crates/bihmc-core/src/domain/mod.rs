//! Request-level configuration for the bispectrum pipeline.
//!
//! All configuration is carried by immutable value structs constructed fresh
//! per call; validation happens up front, before any collaborator is invoked.

pub mod errors;

pub use errors::{BackendError, BackendResult, HmError, HmResult};

use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// Named cosmological parameters consumed by the Boltzmann-backend variant.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Cosmology {
    #[serde(rename = "Omega_m")]
    pub omega_m: f64,
    #[serde(rename = "Omega_c")]
    pub omega_c: f64,
    #[serde(rename = "Omega_b")]
    pub omega_b: f64,
    pub h: f64,
    #[serde(rename = "n_s")]
    pub n_s: f64,
    pub sigma8: f64,
}

/// Halo-model ingredient selection.
///
/// The names are forwarded verbatim to the halo-model collaborator; unknown
/// names fail there, not here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Ingredients {
    pub hmf: String,
    pub concentration: String,
    #[serde(rename = "halo definition")]
    pub halo_definition: String,
    pub profile: String,
}

impl Default for Ingredients {
    fn default() -> Self {
        Self {
            hmf: "Sheth & Tormen (1999)".to_string(),
            concentration: "Duffy et al. (2008)".to_string(),
            halo_definition: "Mvir".to_string(),
            profile: "NFW".to_string(),
        }
    }
}

/// Blending and damping scalars of the smoothed halo-term combination.
///
/// `eta`, `b`, `alpha1`, `alpha2` and `kstar` carry the reference defaults.
/// `f`, `kd` and `nd` are deliberately undefaulted: the engine needs them and
/// omitting one is a configuration error, raised by [`FreeParameters::suppression`]
/// rather than deep inside a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FreeParameters {
    /// Peak-height bloating exponent; zero disables bloating.
    pub eta: f64,
    /// Concentration normalisation; the concentration relation is scaled by `b / 4`.
    #[serde(rename = "B")]
    pub b: f64,
    pub alpha1: f64,
    pub alpha2: f64,
    /// One-halo damping scale forwarded to the engine.
    pub kstar: f64,
    pub f: Option<f64>,
    pub kd: Option<f64>,
    pub nd: Option<f64>,
}

impl Default for FreeParameters {
    fn default() -> Self {
        Self {
            eta: 0.0,
            b: 4.0,
            alpha1: 1.0,
            alpha2: 1.0,
            kstar: 0.0,
            f: None,
            kd: None,
            nd: None,
        }
    }
}

impl FreeParameters {
    /// Validated blending exponents; zero exponents are rejected here because
    /// the blend divides by both of them.
    pub fn blending(&self) -> Result<BlendingExponents, ConfigError> {
        BlendingExponents::new(self.alpha1, self.alpha2)
    }

    /// Validated damping parameters for the engine; missing `f`, `kd` or `nd`
    /// is a configuration error.
    pub fn suppression(&self) -> Result<SuppressionParameters, ConfigError> {
        Ok(SuppressionParameters {
            kstar: self.kstar,
            f: self
                .f
                .ok_or(ConfigError::MissingFreeParameter { name: "f" })?,
            kd: self
                .kd
                .ok_or(ConfigError::MissingFreeParameter { name: "kd" })?,
            nd: self
                .nd
                .ok_or(ConfigError::MissingFreeParameter { name: "nd" })?,
        })
    }
}

/// Non-zero exponent pair of the two-stage power-mean blend.
///
/// Construction is the only way to obtain a value, so downstream arithmetic
/// never sees a zero exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendingExponents {
    alpha1: f64,
    alpha2: f64,
}

impl BlendingExponents {
    pub fn new(alpha1: f64, alpha2: f64) -> Result<Self, ConfigError> {
        if alpha1 == 0.0 {
            return Err(ConfigError::ZeroBlendingExponent { name: "alpha1" });
        }
        if alpha2 == 0.0 {
            return Err(ConfigError::ZeroBlendingExponent { name: "alpha2" });
        }
        Ok(Self { alpha1, alpha2 })
    }

    pub const fn alpha1(self) -> f64 {
        self.alpha1
    }

    pub const fn alpha2(self) -> f64 {
        self.alpha2
    }
}

/// Small-scale suppression parameters forwarded opaquely to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuppressionParameters {
    pub kstar: f64,
    pub f: f64,
    pub kd: f64,
    pub nd: f64,
}

impl Display for SuppressionParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "kstar={}, f={}, kd={}, nd={}",
            self.kstar, self.f, self.kd, self.nd
        )
    }
}

/// Configuration failures detected before any collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("free parameter '{name}' is required but was not supplied")]
    MissingFreeParameter { name: &'static str },
    #[error("blending exponent '{name}' must be non-zero")]
    ZeroBlendingExponent { name: &'static str },
}
