use crate::error::CurvatureError;
use crate::nn::module::Module;
use crate::ops::activation::{selu_op, SELU_ALPHA, SELU_SCALE};
use crate::tensor::Tensor;

/// Layer applying the scaled exponential linear unit element-wise.
#[derive(Debug, Default, Clone)]
pub struct SELU;

impl SELU {
    pub const ALPHA: f64 = SELU_ALPHA;
    pub const SCALE: f64 = SELU_SCALE;

    pub fn new() -> Self {
        SELU
    }
}

impl Module for SELU {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        selu_op(input)
    }
}
