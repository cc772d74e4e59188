use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_binary_op;
use crate::ops::arithmetic::neg_op;
use crate::tensor::Tensor;

#[derive(Debug)]
struct SubBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![grad_output.clone(), neg_op(grad_output)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise `a - b`.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_binary_op(
        a,
        b,
        |x, y| x - y,
        || {
            Arc::new(SubBackward {
                a: a.clone(),
                b: b.clone(),
            })
        },
        "sub_op",
    )
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
