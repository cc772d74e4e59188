use std::sync::Arc;

use log::{debug, warn};

use crate::autograd::engine::run_backward;
use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::arithmetic::add_op;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Checks if this tensor requires gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), CurvatureError> {
        let mut guard = self.write_data();
        if requires_grad && guard.grad_fn.is_some() {
            warn!("Setting requires_grad=true on a non-leaf tensor; gradients will not accumulate here during backward(). Use detach() for a new leaf.");
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a clone of the gradient tensor, if it exists.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    pub fn clear_grad(&self) {
        self.write_data().grad = None;
    }

    /// Accumulates the given gradient into the tensor's `grad` field.
    pub fn acc_grad(&self, grad_to_add: Tensor) -> Result<(), CurvatureError> {
        let existing = self.write_data().grad.take();
        let summed = match existing {
            Some(existing_grad) => add_op(&existing_grad, &grad_to_add)?,
            None => grad_to_add,
        };
        self.write_data().grad = Some(summed);
        Ok(())
    }

    /// Returns the backward node of the operation that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// A leaf is a tensor not produced by a recorded operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Returns a new leaf tensor sharing this tensor's buffer, cut off from the graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_data(TensorData::new_view(
            Arc::clone(&guard.buffer),
            guard.device,
            guard.shape.clone(),
        ))
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// Gradients are accumulated into the `grad` field of every leaf that
    /// requires grad. The graph itself is left untouched, so `backward` can be
    /// called several times on the same output.
    ///
    /// # Arguments
    /// * `gradient`: Initial gradient for this tensor. If `None`, this tensor must
    ///   hold a single element and the initial gradient is one.
    ///
    /// # Errors
    /// * `BackwardNonScalar` if `gradient` is `None` on a multi-element tensor.
    /// * `ShapeMismatch` if `gradient` does not match this tensor's shape.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), CurvatureError> {
        if !self.requires_grad() {
            return Ok(());
        }
        let grad_init = crate::autograd::engine::initial_gradient(self, gradient)?;
        let gradients = run_backward(self, grad_init, false)?;

        let mut leaves = 0;
        for (node, grad) in gradients.leaves() {
            node.acc_grad(grad)?;
            leaves += 1;
        }
        debug!("backward: accumulated gradients into {} leaves", leaves);
        Ok(())
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
