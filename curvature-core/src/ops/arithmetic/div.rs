use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_binary_op;
use crate::ops::arithmetic::{mul_op, neg_op};
use crate::tensor::Tensor;

#[derive(Debug)]
struct DivBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for DivBackward {
    /// `d(a/b)/da = 1/b` and `d(a/b)/db = -a/b²`.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let grad_a = div_op(grad_output, &self.b)?;
        let numerator = mul_op(grad_output, &self.a)?;
        let b_squared = mul_op(&self.b, &self.b)?;
        let grad_b = neg_op(&div_op(&numerator, &b_squared)?)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise `a / b`. Division by zero follows IEEE semantics.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_binary_op(
        a,
        b,
        |x, y| x / y,
        || {
            Arc::new(DivBackward {
                a: a.clone(),
                b: b.clone(),
            })
        },
        "div_op",
    )
}

#[cfg(test)]
#[path = "div_test.rs"]
mod tests;
