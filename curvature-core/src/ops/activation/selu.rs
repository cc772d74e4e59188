use crate::error::CurvatureError;
use crate::ops::arithmetic::{add_scalar_op, mul_scalar_op};
use crate::ops::comparison::{gt_op, where_op};
use crate::ops::math_elem::exp_op;
use crate::tensor::{zeros_like, Tensor};

/// Standard SELU `alpha` (Klambauer et al., 2017).
pub const SELU_ALPHA: f64 = 1.6732632423543772;
/// Standard SELU `scale`.
pub const SELU_SCALE: f64 = 1.0507009873554805;

/// Scaled exponential linear unit with the standard constants.
pub fn selu_op(input: &Tensor) -> Result<Tensor, CurvatureError> {
    selu_with_op(input, SELU_ALPHA, SELU_SCALE)
}

/// `scale * x` for `x > 0`, `scale * alpha * (e^x - 1)` otherwise.
///
/// Both branches are evaluated in full and combined with `where_op`. The
/// exponential only sees the non-positive entries, so it stays finite for
/// large positive inputs.
pub fn selu_with_op(input: &Tensor, alpha: f64, scale: f64) -> Result<Tensor, CurvatureError> {
    let positive = gt_op(input, 0.0)?;
    let linear = mul_scalar_op(input, scale)?;
    let clamped = where_op(&positive, &zeros_like(input)?, input)?;
    let exponential = mul_scalar_op(&add_scalar_op(&exp_op(&clamped)?, -1.0)?, scale * alpha)?;
    where_op(&positive, &linear, &exponential)
}

#[cfg(test)]
#[path = "selu_test.rs"]
mod tests;
