use log::debug;

use crate::autograd::engine::grad;
use crate::autograd::grad_mode::GradModeGuard;
use crate::error::CurvatureError;
use crate::ops::view::{index_select_op, reshape_op};
use crate::tensor::Tensor;

/// Computes the full Hessian of a single-element `loss` with respect to `input`.
///
/// The result has shape `[K, K]` with `K = input.numel()`, indexed in the
/// row-major order of `input`. The gradient is computed once with
/// `create_graph = true`, then each of its `K` entries is differentiated again.
///
/// Entries of the gradient that do not depend on `input` give zero rows.
pub fn exact_hessian(loss: &Tensor, input: &Tensor) -> Result<Tensor, CurvatureError> {
    if loss.numel() != 1 {
        return Err(CurvatureError::BackwardNonScalar);
    }
    let _mode = GradModeGuard::new(true);
    let k = input.numel();
    debug!("exact_hessian: {} x {} entries", k, k);

    let gradient = grad(loss, &[input.clone()], None, true)?
        .pop()
        .ok_or_else(|| CurvatureError::InternalError("grad returned no gradient".to_string()))?;
    let flat_gradient = reshape_op(&gradient, vec![k])?;

    let mut rows = Vec::with_capacity(k * k);
    for i in 0..k {
        let entry = reshape_op(&index_select_op(&flat_gradient, 0, &[i])?, vec![])?;
        let row = grad(&entry, &[input.clone()], None, false)?
            .pop()
            .ok_or_else(|| CurvatureError::InternalError("grad returned no gradient".to_string()))?;
        rows.extend(row.to_vec());
    }
    Tensor::new(rows, vec![k, k])
}

#[cfg(test)]
#[path = "hessian_test.rs"]
mod tests;
