use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_binary_op;
use crate::tensor::Tensor;

/// Backward pass structure for element-wise multiplication.
///
/// Keeps both operands: the gradient of each is the upstream gradient times
/// the other operand.
#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let grad_a = mul_op(grad_output, &self.b)?;
        let grad_b = mul_op(grad_output, &self.a)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Performs element-wise multiplication (Hadamard product) of two tensors.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_binary_op(
        a,
        b,
        |x, y| x * y,
        || {
            Arc::new(MulBackward {
                a: a.clone(),
                b: b.clone(),
            })
        },
        "mul_op",
    )
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
