use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;

#[derive(Debug)]
struct AddScalarBackward {
    a: Tensor,
}

impl BackwardOp for AddScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![grad_output.clone()])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

#[derive(Debug)]
struct MulScalarBackward {
    a: Tensor,
    scalar: f64,
}

impl BackwardOp for MulScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![mul_scalar_op(grad_output, self.scalar)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Adds `scalar` to every element.
pub fn add_scalar_op(a: &Tensor, scalar: f64) -> Result<Tensor, CurvatureError> {
    apply_unary_op(
        a,
        |x| x + scalar,
        || Arc::new(AddScalarBackward { a: a.clone() }),
        "add_scalar_op",
    )
}

/// Multiplies every element by `scalar`.
pub fn mul_scalar_op(a: &Tensor, scalar: f64) -> Result<Tensor, CurvatureError> {
    apply_unary_op(
        a,
        |x| x * scalar,
        || {
            Arc::new(MulScalarBackward {
                a: a.clone(),
                scalar,
            })
        },
        "mul_scalar_op",
    )
}

#[cfg(test)]
#[path = "scalar_test.rs"]
mod tests;
