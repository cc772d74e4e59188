use crate::device::StorageDevice;
use thiserror::Error;

/// Error type shared by every tensor, autograd and layer operation of the runtime.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CurvatureError {
    #[error("Shape mismatch: expected {expected}, got {actual} during operation {operation}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Rank mismatch: expected rank {expected}, got {actual} during operation {operation}")]
    RankMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Index out of bounds: index {index} for axis of size {size} during operation {operation}")]
    IndexOutOfBounds {
        index: usize,
        size: usize,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Device mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DeviceMismatch {
        expected: StorageDevice,
        actual: StorageDevice,
        operation: String,
    },

    #[error("Backward called on non-scalar tensor without explicit gradient.")]
    BackwardNonScalar,

    #[error("Invalid einsum equation '{equation}': {reason}")]
    InvalidEquation { equation: String, reason: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CurvatureError {
    /// Shorthand for a [`CurvatureError::ShapeMismatch`] built from two shapes.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize], operation: &str) -> Self {
        CurvatureError::ShapeMismatch {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
            operation: operation.to_string(),
        }
    }
}
