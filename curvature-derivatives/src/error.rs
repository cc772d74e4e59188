use curvature_core::CurvatureError;
use thiserror::Error;

/// Errors raised by derivative providers and the test oracle.
///
/// Every variant is a usage or programming error surfaced at the call site;
/// nothing here is retried or recovered.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum DerivativesError {
    #[error("{operation} is not implemented by {provider}")]
    NotImplemented { operation: String, provider: String },

    #[error("{operation} supports inputs of rank {expected} only, got rank {actual}")]
    UnsupportedInputRank {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("{module} needs a target tensor")]
    MissingTarget { module: String },

    #[error("{provider} has no {parameter} parameter")]
    MissingParameter { parameter: String, provider: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{what} differs at element {index}: got {actual}, expected {expected}")]
    Mismatch {
        what: String,
        index: usize,
        expected: f64,
        actual: f64,
    },

    #[error(transparent)]
    Tensor(#[from] CurvatureError),
}
