//! Pipeline error surface.
//!
//! Configuration and shape problems are diagnosed by this crate; physics
//! failures are carried through from the collaborators unmodified.

use crate::bispectrum::blend::BlendError;
use crate::bispectrum::grid::CubeShapeError;
use crate::domain::ConfigError;
use crate::power::dewiggle::DewiggleError;

pub type HmResult<T> = Result<T, HmError>;

/// Error surfaced by an external collaborator (halo-model or cosmology
/// library). This layer never reinterprets the physics behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("unknown {kind} model '{name}'")]
    UnknownModel { kind: &'static str, name: String },
    #[error("{context}: {message}")]
    Evaluation {
        context: &'static str,
        message: String,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Top-level pipeline error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HmError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Blend(#[from] BlendError),
    #[error(transparent)]
    Shape(#[from] CubeShapeError),
    #[error(transparent)]
    Dewiggle(#[from] DewiggleError),
    #[error("{stage} call failed")]
    Backend {
        stage: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("bispectrum engine returned no '{channel}' channel in the {term} term")]
    MissingChannel {
        term: &'static str,
        channel: String,
    },
    #[error("{context}: expected {expected} values, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl HmError {
    pub fn backend(stage: &'static str, source: BackendError) -> Self {
        Self::Backend { stage, source }
    }
}
