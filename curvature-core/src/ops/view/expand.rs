use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::reduction::sum_dim_op;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ExpandDimBackward {
    a: Tensor,
    dim: usize,
}

impl BackwardOp for ExpandDimBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![sum_dim_op(grad_output, self.dim)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Inserts a new axis of length `size` at position `dim`, repeating the data
/// along it. The adjoint of `sum_dim_op`.
///
/// # Errors
/// Returns `IndexOutOfBounds` if `dim > rank`.
pub fn expand_dim_op(a: &Tensor, dim: usize, size: usize) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "expand_dim_op")?;
    let shape = a.shape();
    if dim > shape.len() {
        return Err(CurvatureError::IndexOutOfBounds {
            index: dim,
            size: shape.len() + 1,
            operation: "expand_dim_op".to_string(),
        });
    }
    let outer: usize = shape[..dim].iter().product();
    let inner: usize = shape[dim..].iter().product();
    let buffer = a.buffer();
    let mut data = Vec::with_capacity(outer * size * inner);
    for o in 0..outer {
        let block = &buffer[o * inner..(o + 1) * inner];
        for _ in 0..size {
            data.extend_from_slice(block);
        }
    }
    let mut output_shape = shape;
    output_shape.insert(dim, size);
    let output = Tensor::new(data, output_shape)?;

    if requires_graph(&[a]) {
        let grad_fn = ExpandDimBackward { a: a.clone(), dim };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;
