use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::view::{expand_dim_op, reshape_op};
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::utils::split_at_dim;
use crate::tensor::Tensor;

/// Backward pass structure for `sum_dim_op`: the gradient is repeated along
/// the reduced axis.
#[derive(Debug)]
struct SumDimBackward {
    a: Tensor,
    dim: usize,
    size: usize,
}

impl BackwardOp for SumDimBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![expand_dim_op(grad_output, self.dim, self.size)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Sums over axis `dim`, removing it from the shape.
///
/// # Errors
/// Returns `IndexOutOfBounds` if `dim` is not an axis of `a`.
pub fn sum_dim_op(a: &Tensor, dim: usize) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "sum_dim_op")?;
    let shape = a.shape();
    if dim >= shape.len() {
        return Err(CurvatureError::IndexOutOfBounds {
            index: dim,
            size: shape.len(),
            operation: "sum_dim_op".to_string(),
        });
    }
    let (outer, size, inner) = split_at_dim(&shape, dim);
    let buffer = a.buffer();
    let mut data = vec![0.0; outer * inner];
    for o in 0..outer {
        for s in 0..size {
            let src = (o * size + s) * inner;
            let dst = o * inner;
            for i in 0..inner {
                data[dst + i] += buffer[src + i];
            }
        }
    }
    let mut output_shape = shape;
    output_shape.remove(dim);
    let output = Tensor::new(data, output_shape)?;

    if requires_graph(&[a]) {
        let grad_fn = SumDimBackward {
            a: a.clone(),
            dim,
            size,
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

/// Sums every element into a 0-dimensional tensor.
pub fn sum_all_op(a: &Tensor) -> Result<Tensor, CurvatureError> {
    let flat = reshape_op(a, vec![a.numel()])?;
    sum_dim_op(&flat, 0)
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
