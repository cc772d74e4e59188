use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_binary_op;
use crate::tensor::Tensor;

/// Backward pass structure for the element-wise addition operation.
#[derive(Debug)]
struct AddBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for AddBackward {
    /// Both inputs receive the upstream gradient unchanged.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![grad_output.clone(), grad_output.clone()])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Performs element-wise addition of two tensors of identical shape.
///
/// # Errors
/// Returns `ShapeMismatch` if the shapes differ.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_binary_op(
        a,
        b,
        |x, y| x + y,
        || {
            Arc::new(AddBackward {
                a: a.clone(),
                b: b.clone(),
            })
        },
        "add_op",
    )
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
