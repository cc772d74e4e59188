use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_unary_op;
use crate::ops::arithmetic::mul_op;
use crate::tensor::Tensor;

/// Backward pass structure for the element-wise exponential.
///
/// Stores the input rather than the output and recomputes `exp(a)` during
/// backward, so the output is not referenced from its own `grad_fn`.
#[derive(Debug)]
struct ExpBackward {
    a: Tensor,
}

impl BackwardOp for ExpBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let exp_a = exp_op(&self.a)?;
        Ok(vec![mul_op(grad_output, &exp_a)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Computes `e^x` element-wise.
pub fn exp_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_unary_op(a, f64::exp, || Arc::new(ExpBackward { a: a.clone() }), "exp_op")
}

#[cfg(test)]
#[path = "exp_test.rs"]
mod tests;
