use rand::distributions::{Distribution, Uniform};
use rand::RngCore;

use crate::error::CurvatureError;
use crate::tensor::Tensor;

/// Samples a tensor from `U(-1/√fan_in, 1/√fan_in)`.
///
/// This is the default initialisation of linear layers (Kaiming uniform with
/// `a = √5`).
pub fn kaiming_uniform(
    shape: &[usize],
    fan_in: usize,
    rng: &mut dyn RngCore,
) -> Result<Tensor, CurvatureError> {
    if fan_in == 0 {
        return Err(CurvatureError::UnsupportedOperation(
            "kaiming_uniform requires fan_in > 0".to_string(),
        ));
    }
    let bound = 1.0 / (fan_in as f64).sqrt();
    let distribution = Uniform::new_inclusive(-bound, bound);
    let numel: usize = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|_| distribution.sample(&mut *rng)).collect();
    Tensor::new(data, shape.to_vec())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
