//! Host tensor runtime for the Curvature derivative providers.
//!
//! Provides an `f64` CPU [`Tensor`] with reverse-mode automatic differentiation
//! (including differentiation of the backward pass itself), the element-wise,
//! reduction, view and linear-algebra operations the providers are built from,
//! and the small catalog of neural-network layers they know how to differentiate.

pub mod autograd;
pub mod device;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

pub use device::StorageDevice;
pub use error::CurvatureError;
pub use tensor::Tensor;
