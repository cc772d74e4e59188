use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::apply_unary_op;
use crate::ops::arithmetic::{div_op, mul_scalar_op};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SqrtBackward {
    a: Tensor,
}

impl BackwardOp for SqrtBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let twice_sqrt = mul_scalar_op(&sqrt_op(&self.a)?, 2.0)?;
        Ok(vec![div_op(grad_output, &twice_sqrt)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Element-wise square root.
pub fn sqrt_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    apply_unary_op(a, f64::sqrt, || Arc::new(SqrtBackward { a: a.clone() }), "sqrt_op")
}
