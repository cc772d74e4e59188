use std::fmt::Debug;
use std::str::FromStr;

use crate::error::CurvatureError;
use crate::tensor::Tensor;

pub mod cross_entropy;
pub mod mse;

pub use cross_entropy::{log_sum_exp, one_hot, CrossEntropyLoss};
pub use mse::MSELoss;

/// Specifies the reduction applied to per-element losses: `'mean' | 'sum'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

impl FromStr for Reduction {
    type Err = CurvatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            _ => Err(CurvatureError::UnsupportedOperation(format!(
                "Unsupported reduction type: {}",
                s
            ))),
        }
    }
}

/// A loss maps a prediction and a target to a single-element tensor.
pub trait Loss: Debug + Send + Sync {
    fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, CurvatureError>;

    fn reduction(&self) -> Reduction;
}
