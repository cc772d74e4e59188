use crate::error::CurvatureError;
use crate::ops::check_cpu;
use crate::tensor::Tensor;

/// Element-wise `tensor > threshold` as a `0.0`/`1.0` mask.
///
/// Comparisons are not differentiable: the mask never requires grad.
pub fn gt_op(tensor: &Tensor, threshold: f64) -> Result<Tensor, CurvatureError> {
    check_cpu(tensor, "gt_op")?;
    let data: Vec<f64> = tensor
        .buffer()
        .iter()
        .map(|&v| if v > threshold { 1.0 } else { 0.0 })
        .collect();
    Tensor::new(data, tensor.shape())
}

#[cfg(test)]
#[path = "gt_test.rs"]
mod tests;
