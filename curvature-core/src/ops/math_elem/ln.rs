use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_unary_op;
use crate::ops::arithmetic::div_op;
use crate::tensor::Tensor;

/// Backward pass structure for the element-wise natural logarithm (`ln`) operation.
#[derive(Debug)]
struct LnBackward {
    a: Tensor,
}

impl BackwardOp for LnBackward {
    /// `d(ln a)/da = 1/a`.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![div_op(grad_output, &self.a)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Computes the natural logarithm element-wise.
///
/// Non-positive inputs produce `-inf` or `NaN` following IEEE semantics.
pub fn ln_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_unary_op(a, f64::ln, || Arc::new(LnBackward { a: a.clone() }), "ln_op")
}

#[cfg(test)]
#[path = "ln_test.rs"]
mod tests;
