use curvature_core::ops::comparison::gt_op;
use curvature_core::tensor::zeros_like;
use curvature_core::{CurvatureError, Tensor};

use super::elementwise::{ElementwiseDerivatives, ElementwiseFunction};

/// `relu(x) = max(x, 0)`. The derivative at zero is taken as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReLUFunction;

impl ElementwiseFunction for ReLUFunction {
    fn name(&self) -> &'static str {
        "ReLUDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        true
    }

    fn df(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        gt_op(input, 0.0)
    }

    fn d2f(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        zeros_like(input)
    }
}

pub type ReLUDerivatives = ElementwiseDerivatives<ReLUFunction>;
