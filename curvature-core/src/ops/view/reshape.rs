use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Backward pass structure for the reshape operation.
///
/// Stores the original input shape to reshape the gradient back.
#[derive(Debug)]
struct ReshapeBackward {
    a: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![reshape_op(grad_output, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Returns a tensor with the same data and a new shape.
///
/// Data is always contiguous, so the result shares the input's buffer.
///
/// # Errors
/// Returns `ShapeMismatch` if the number of elements differs.
pub fn reshape_op(a: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "reshape_op")?;
    let (buffer, device, input_shape) = {
        let guard = a.read_data();
        (Arc::clone(&guard.buffer), guard.device, guard.shape.clone())
    };
    let new_numel: usize = new_shape.iter().product();
    if new_numel != buffer.len() {
        return Err(CurvatureError::shape_mismatch(&new_shape, &input_shape, "reshape_op"));
    }
    let output = Tensor::from_data(TensorData::new_view(buffer, device, new_shape));

    if requires_graph(&[a]) {
        let grad_fn = ReshapeBackward {
            a: a.clone(),
            input_shape,
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

#[cfg(test)]
#[path = "reshape_test.rs"]
mod tests;
