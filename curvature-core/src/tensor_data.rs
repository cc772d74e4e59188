use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::device::StorageDevice;
use crate::error::CurvatureError;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Data is always laid out contiguously in row-major order. The buffer sits
/// behind an `Arc` so that reshapes and detached copies share it instead of
/// copying.
pub struct TensorData {
    pub(crate) buffer: Arc<Vec<f64>>,
    pub(crate) device: StorageDevice,
    pub(crate) shape: Vec<usize>,
    /// Whether operations involving this tensor are recorded for autograd.
    pub(crate) requires_grad: bool,
    /// Gradient accumulated by [`Tensor::backward`] on leaf tensors.
    pub(crate) grad: Option<Tensor>,
    /// Backward node of the operation that produced this tensor. `None` for leaves.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates CPU tensor data from a row-major buffer.
    ///
    /// # Errors
    /// Returns `CurvatureError::TensorCreationError` if `data_vec.len()` does not
    /// match the number of elements described by `shape`.
    pub fn new(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, CurvatureError> {
        let numel: usize = shape.iter().product();
        if data_vec.len() != numel {
            return Err(CurvatureError::TensorCreationError {
                data_len: data_vec.len(),
                shape,
            });
        }
        Ok(Self::new_view(Arc::new(data_vec), StorageDevice::CPU, shape))
    }

    /// Creates tensor data sharing an existing buffer.
    pub(crate) fn new_view(buffer: Arc<Vec<f64>>, device: StorageDevice, shape: Vec<usize>) -> Self {
        TensorData {
            buffer,
            device,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        }
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn buffer(&self) -> &Arc<Vec<f64>> {
        &self.buffer
    }
}

impl Debug for TensorData {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TensorData")
            .field("shape", &self.shape)
            .field("device", &self.device)
            .field("data", &self.buffer)
            .field("requires_grad", &self.requires_grad)
            .field("grad_defined", &self.grad.is_some())
            .field("grad_fn_defined", &self.grad_fn.is_some())
            .finish()
    }
}
