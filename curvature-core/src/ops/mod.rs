//! # Tensor Operations Module (`ops`)
//!
//! Operations are grouped by functionality. Each operation has a core function
//! named `xxx_op` that performs the forward computation and, when the graph is
//! recorded, attaches a `XxxBackward` struct implementing
//! [`BackwardOp`](crate::autograd::BackwardOp) to its output.
//!
//! Backward structs compute their gradients with the same `xxx_op` functions,
//! which is what makes double backward work.
//!
//! - [`arithmetic`]: element-wise add, sub, mul, div, neg and scalar variants.
//! - [`math_elem`]: element-wise `exp`, `ln`, `sqrt`.
//! - [`comparison`]: threshold masks and `where_op`.
//! - [`activation`]: ReLU and SELU, composed from the ops above.
//! - [`reduction`]: sums over one axis or all elements.
//! - [`view`]: reshape, axis expansion, transpose, index selection.
//! - [`linalg`]: `matmul_op` and `einsum_op`.

use std::sync::Arc;

use crate::autograd::{is_grad_enabled, BackwardOp};
use crate::device::StorageDevice;
use crate::error::CurvatureError;
use crate::tensor::Tensor;

pub mod activation;
pub mod arithmetic;
pub mod comparison;
pub mod linalg;
pub mod math_elem;
pub mod reduction;
pub mod view;

pub(crate) fn check_cpu(tensor: &Tensor, op_name: &str) -> Result<(), CurvatureError> {
    let device = tensor.device();
    if device != StorageDevice::CPU {
        return Err(CurvatureError::DeviceMismatch {
            expected: StorageDevice::CPU,
            actual: device,
            operation: op_name.to_string(),
        });
    }
    Ok(())
}

/// Whether an op on `inputs` must record a backward node.
pub(crate) fn requires_graph(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Marks `output` as the result of a recorded operation.
pub(crate) fn attach_grad_fn(output: Tensor, grad_fn: Arc<dyn BackwardOp>) -> Tensor {
    {
        let mut guard = output.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }
    output
}

/// Applies a unary element-wise operation to a tensor.
///
/// Handles the device check, output creation and autograd setup. The backward
/// node is only built when the graph is recorded.
pub(crate) fn apply_unary_op<F, B>(
    a: &Tensor,
    op: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, CurvatureError>
where
    F: Fn(f64) -> f64,
    B: FnOnce() -> Arc<dyn BackwardOp>,
{
    check_cpu(a, op_name)?;
    let output_data: Vec<f64> = a.buffer().iter().map(|&v| op(v)).collect();
    let output = Tensor::new(output_data, a.shape())?;
    if requires_graph(&[a]) {
        Ok(attach_grad_fn(output, backward_builder()))
    } else {
        Ok(output)
    }
}

/// Applies a binary element-wise operation to two tensors of identical shape.
pub(crate) fn apply_binary_op<F, B>(
    a: &Tensor,
    b: &Tensor,
    op: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, CurvatureError>
where
    F: Fn(f64, f64) -> f64,
    B: FnOnce() -> Arc<dyn BackwardOp>,
{
    check_cpu(a, op_name)?;
    check_cpu(b, op_name)?;
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape != b_shape {
        return Err(CurvatureError::shape_mismatch(&a_shape, &b_shape, op_name));
    }
    let a_buffer = a.buffer();
    let b_buffer = b.buffer();
    let output_data: Vec<f64> = a_buffer
        .iter()
        .zip(b_buffer.iter())
        .map(|(&x, &y)| op(x, y))
        .collect();
    let output = Tensor::new(output_data, a_shape)?;
    if requires_graph(&[a, b]) {
        Ok(attach_grad_fn(output, backward_builder()))
    } else {
        Ok(output)
    }
}
