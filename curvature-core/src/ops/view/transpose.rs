use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::Tensor;

#[derive(Debug)]
struct TransposeBackward {
    a: Tensor,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![transpose_op(grad_output)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Transposes a 2-D tensor into a new contiguous tensor.
pub fn transpose_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "transpose_op")?;
    let shape = a.shape();
    if shape.len() != 2 {
        return Err(CurvatureError::RankMismatch {
            expected: 2,
            actual: shape.len(),
            operation: "transpose_op".to_string(),
        });
    }
    let (rows, cols) = (shape[0], shape[1]);
    let buffer = a.buffer();
    let mut data = vec![0.0; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            data[c * rows + r] = buffer[r * cols + c];
        }
    }
    let output = Tensor::new(data, vec![cols, rows])?;

    if requires_graph(&[a]) {
        Ok(attach_grad_fn(output, Arc::new(TransposeBackward { a: a.clone() })))
    } else {
        Ok(output)
    }
}
