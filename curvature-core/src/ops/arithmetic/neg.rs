use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;

#[derive(Debug)]
struct NegBackward {
    a: Tensor,
}

impl BackwardOp for NegBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![neg_op(grad_output)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Element-wise negation.
pub fn neg_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_unary_op(a, |x| -x, || Arc::new(NegBackward { a: a.clone() }), "neg_op")
}
