use crate::error::CurvatureError;
use crate::nn::module::Module;
use crate::ops::view::reshape_op;
use crate::tensor::Tensor;

/// Reshapes its input to a fixed target shape.
///
/// The target covers the whole tensor, batch axis included. At most one entry
/// may be `-1`; it is inferred from the element count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    target: Vec<isize>,
}

impl View {
    /// # Errors
    /// `UnsupportedOperation` if the target holds more than one `-1` or any
    /// other negative entry.
    pub fn new(target: Vec<isize>) -> Result<Self, CurvatureError> {
        if target.iter().filter(|&&d| d == -1).count() > 1 {
            return Err(CurvatureError::UnsupportedOperation(format!(
                "View target {:?} has more than one inferred axis",
                target
            )));
        }
        if target.iter().any(|&d| d < -1) {
            return Err(CurvatureError::UnsupportedOperation(format!(
                "View target {:?} has a negative axis",
                target
            )));
        }
        Ok(View { target })
    }

    pub fn target(&self) -> &[isize] {
        &self.target
    }

    /// Resolves the concrete output shape for an input shape.
    ///
    /// # Errors
    /// `ShapeMismatch` if the element counts cannot agree.
    pub fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CurvatureError> {
        let numel: usize = input_shape.iter().product();
        let known: usize = self
            .target
            .iter()
            .filter(|&&d| d != -1)
            .map(|&d| d as usize)
            .product();
        let mismatch = || CurvatureError::ShapeMismatch {
            expected: format!("{:?}", self.target),
            actual: format!("{:?}", input_shape),
            operation: "View".to_string(),
        };
        let inferred = if self.target.contains(&-1) {
            if known == 0 || numel % known != 0 {
                return Err(mismatch());
            }
            numel / known
        } else {
            if known != numel {
                return Err(mismatch());
            }
            0
        };
        Ok(self
            .target
            .iter()
            .map(|&d| if d == -1 { inferred } else { d as usize })
            .collect())
    }
}

impl Module for View {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        reshape_op(input, self.output_shape(&input.shape())?)
    }
}

/// Flattens every axis after the batch axis: `[N, ...] -> [N, prod(...)]`.
#[derive(Debug, Default, Clone)]
pub struct Flatten;

impl Flatten {
    pub fn new() -> Self {
        Flatten
    }

    pub fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, CurvatureError> {
        match input_shape.split_first() {
            Some((&batch, rest)) => Ok(vec![batch, rest.iter().product()]),
            None => Err(CurvatureError::RankMismatch {
                expected: 1,
                actual: 0,
                operation: "Flatten".to_string(),
            }),
        }
    }
}

impl Module for Flatten {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        reshape_op(input, self.output_shape(&input.shape())?)
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
