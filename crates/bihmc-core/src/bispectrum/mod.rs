//! Bispectrum engine seam and its output terms.

pub mod blend;
pub mod grid;

pub use blend::{blend_contributions, BlendError};
pub use grid::{reshape_cube, BispectrumDecomposition, CubeShapeError};

use crate::domain::{BackendResult, HmError, HmResult, SuppressionParameters};
use crate::halo::MatterProfile;
use std::collections::BTreeMap;

/// Channel key of the three-tracer triangle for a single tracer name.
pub fn tracer_channel(name: &str) -> String {
    format!("{name}-{name}-{name}")
}

/// Everything the external bispectrum engine consumes.
///
/// `fast_calc` and `only_equilateral` are forwarded opaquely; the engine
/// decides what they mean.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest<'a> {
    pub ks: &'a [f64],
    pub pk_lin: &'a [f64],
    pub ms: &'a [f64],
    pub sigmas: &'a [f64],
    pub profiles: &'a BTreeMap<String, MatterProfile>,
    pub suppression: SuppressionParameters,
    pub fast_calc: bool,
    pub only_equilateral: bool,
}

/// Flat per-channel contributions returned by the engine: one map per halo
/// term plus the engine's own aggregate, which is carried for parity but
/// unused downstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BispectrumTerms {
    pub three_halo: BTreeMap<String, Vec<f64>>,
    pub two_halo: BTreeMap<String, Vec<f64>>,
    pub one_halo: BTreeMap<String, Vec<f64>>,
    pub sum: BTreeMap<String, Vec<f64>>,
}

impl BispectrumTerms {
    /// The named channel of one halo term, or a missing-channel error.
    pub fn channel<'a>(&'a self, term: Term, channel: &str) -> HmResult<&'a [f64]> {
        let map = match term {
            Term::OneHalo => &self.one_halo,
            Term::TwoHalo => &self.two_halo,
            Term::ThreeHalo => &self.three_halo,
        };
        map.get(channel)
            .map(Vec::as_slice)
            .ok_or_else(|| HmError::MissingChannel {
                term: term.as_str(),
                channel: channel.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    OneHalo,
    TwoHalo,
    ThreeHalo,
}

impl Term {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneHalo => "one-halo",
            Self::TwoHalo => "two-halo",
            Self::ThreeHalo => "three-halo",
        }
    }
}

/// External halo-model bispectrum routine.
pub trait BispectrumEngine {
    fn bispectrum(&self, request: &EngineRequest<'_>) -> BackendResult<BispectrumTerms>;
}
