use curvature_core::nn::SELU;
use curvature_core::ops::arithmetic::mul_scalar_op;
use curvature_core::ops::comparison::{gt_op, where_op};
use curvature_core::ops::math_elem::exp_op;
use curvature_core::tensor::{full_like, zeros_like};
use curvature_core::{CurvatureError, Tensor};

use super::elementwise::{ElementwiseDerivatives, ElementwiseFunction};

/// `selu(x) = scale · x` for `x > 0`, `scale · α · (eˣ − 1)` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SELUFunction {
    alpha: f64,
    scale: f64,
}

impl SELUFunction {
    pub fn new(alpha: f64, scale: f64) -> Self {
        SELUFunction { alpha, scale }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn negative_branch(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        mul_scalar_op(&exp_op(input)?, self.scale * self.alpha)
    }
}

impl Default for SELUFunction {
    fn default() -> Self {
        SELUFunction::new(SELU::ALPHA, SELU::SCALE)
    }
}

impl ElementwiseFunction for SELUFunction {
    fn name(&self) -> &'static str {
        "SELUDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        false
    }

    fn df(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        let positive = gt_op(input, 0.0)?;
        where_op(&positive, &full_like(input, self.scale)?, &self.negative_branch(input)?)
    }

    fn d2f(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        let positive = gt_op(input, 0.0)?;
        where_op(&positive, &zeros_like(input)?, &self.negative_branch(input)?)
    }
}

pub type SELUDerivatives = ElementwiseDerivatives<SELUFunction>;
