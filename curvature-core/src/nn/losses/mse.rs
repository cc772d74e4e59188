use crate::error::CurvatureError;
use crate::nn::losses::{Loss, Reduction};
use crate::ops::arithmetic::{mul_op, mul_scalar_op, sub_op};
use crate::ops::reduction::sum_all_op;
use crate::tensor::Tensor;

/// Computes the Mean Squared Error (MSE) loss between input and target tensors.
///
/// `Mean` divides the summed squared error by the total number of elements.
#[derive(Debug, Clone, Default)]
pub struct MSELoss {
    reduction: Reduction,
}

impl MSELoss {
    pub fn new(reduction: Reduction) -> Self {
        MSELoss { reduction }
    }
}

impl Loss for MSELoss {
    fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, CurvatureError> {
        if input.shape() != target.shape() {
            return Err(CurvatureError::shape_mismatch(
                &target.shape(),
                &input.shape(),
                "MSELoss calculate",
            ));
        }
        let diff = sub_op(input, target)?;
        let total = sum_all_op(&mul_op(&diff, &diff)?)?;
        match self.reduction {
            Reduction::Sum => Ok(total),
            Reduction::Mean => mul_scalar_op(&total, 1.0 / input.numel() as f64),
        }
    }

    fn reduction(&self) -> Reduction {
        self.reduction
    }
}

#[cfg(test)]
#[path = "mse_test.rs"]
mod tests;
