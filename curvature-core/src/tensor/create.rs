// src/tensor/create.rs

use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::device::StorageDevice;
use crate::error::CurvatureError;
use crate::tensor::Tensor;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, CurvatureError> {
    full(shape, 0.0)
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, CurvatureError> {
    full(shape, 1.0)
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f64) -> Result<Tensor, CurvatureError> {
    let numel: usize = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a zero tensor on an explicit device.
///
/// Only `StorageDevice::CPU` is backed by an implementation.
pub fn zeros_on(shape: &[usize], device: StorageDevice) -> Result<Tensor, CurvatureError> {
    if device != StorageDevice::CPU {
        return Err(CurvatureError::DeviceMismatch {
            expected: StorageDevice::CPU,
            actual: device,
            operation: "zeros_on".to_string(),
        });
    }
    zeros(shape)
}

/// Creates a new tensor filled with zeros, having the same shape as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, CurvatureError> {
    zeros(&tensor.shape())
}

/// Creates a new tensor filled with ones, having the same shape as the input tensor.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, CurvatureError> {
    ones(&tensor.shape())
}

pub fn full_like(tensor: &Tensor, value: f64) -> Result<Tensor, CurvatureError> {
    full(&tensor.shape(), value)
}

/// Creates a 2-D identity matrix of size `n x n`.
pub fn eye(n: usize) -> Result<Tensor, CurvatureError> {
    let mut data_vec = vec![0.0; n * n];
    for i in 0..n {
        data_vec[i * n + i] = 1.0;
    }
    Tensor::new(data_vec, vec![n, n])
}

/// Creates a square matrix with `values` on its diagonal.
///
/// `values` must be 1-D.
pub fn diag(values: &Tensor) -> Result<Tensor, CurvatureError> {
    let shape = values.shape();
    if shape.len() != 1 {
        return Err(CurvatureError::RankMismatch {
            expected: 1,
            actual: shape.len(),
            operation: "diag".to_string(),
        });
    }
    let n = shape[0];
    let buffer = values.buffer();
    let mut data_vec = vec![0.0; n * n];
    for (i, v) in buffer.iter().enumerate() {
        data_vec[i * n + i] = *v;
    }
    Tensor::new(data_vec, vec![n, n])
}

/// Creates a tensor with values drawn from the standard normal distribution.
///
/// The generator is passed in so callers control seeding.
pub fn randn(shape: &[usize], rng: &mut dyn RngCore) -> Result<Tensor, CurvatureError> {
    let numel: usize = shape.iter().product();
    let data_vec: Vec<f64> = (0..numel).map(|_| StandardNormal.sample(&mut *rng)).collect();
    Tensor::new(data_vec, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
