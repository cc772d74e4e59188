use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::{zeros_like, Tensor};

/// Backward pass structure for `where_op`.
///
/// The upstream gradient is routed to `x` where the condition holds and to
/// `y` elsewhere. The condition itself receives no gradient.
#[derive(Debug)]
struct WhereBackward {
    condition: Tensor,
    x: Tensor,
    y: Tensor,
}

impl BackwardOp for WhereBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let zeros = zeros_like(grad_output)?;
        let grad_x = where_op(&self.condition, grad_output, &zeros)?;
        let grad_y = where_op(&self.condition, &zeros, grad_output)?;
        Ok(vec![grad_x, grad_y])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.y.clone()]
    }
}

/// Selects element-wise from `x` where `condition` is non-zero and from `y`
/// elsewhere.
///
/// This is a pure select-and-combine: neither branch is modified, and both
/// are computed in full by the caller. All three tensors must share one shape.
///
/// # Errors
/// Returns `ShapeMismatch` if the shapes differ.
pub fn where_op(condition: &Tensor, x: &Tensor, y: &Tensor) -> Result<Tensor, CurvatureError> {
    check_cpu(condition, "where_op")?;
    check_cpu(x, "where_op")?;
    check_cpu(y, "where_op")?;
    let shape = condition.shape();
    for other in [x, y] {
        let other_shape = other.shape();
        if other_shape != shape {
            return Err(CurvatureError::shape_mismatch(&shape, &other_shape, "where_op"));
        }
    }

    let condition_buffer = condition.buffer();
    let x_buffer = x.buffer();
    let y_buffer = y.buffer();
    let data: Vec<f64> = condition_buffer
        .iter()
        .zip(x_buffer.iter().zip(y_buffer.iter()))
        .map(|(&c, (&xv, &yv))| if c != 0.0 { xv } else { yv })
        .collect();
    let output = Tensor::new(data, shape)?;

    if requires_graph(&[x, y]) {
        let grad_fn = WhereBackward {
            condition: condition.detach(),
            x: x.clone(),
            y: y.clone(),
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

#[cfg(test)]
#[path = "where_op_test.rs"]
mod tests;
