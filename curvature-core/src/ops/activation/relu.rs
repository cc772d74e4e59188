use crate::error::CurvatureError;
use crate::ops::comparison::{gt_op, where_op};
use crate::tensor::{zeros_like, Tensor};

/// Rectified linear unit: `max(x, 0)` element-wise.
///
/// Composed from `gt_op` and `where_op`, so its backward pass (and the
/// backward of that backward) comes from those ops.
pub fn relu_op(input: &Tensor) -> Result<Tensor, CurvatureError> {
    let positive = gt_op(input, 0.0)?;
    where_op(&positive, input, &zeros_like(input)?)
}

#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;
