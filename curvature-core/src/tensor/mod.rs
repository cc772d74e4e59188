// src/tensor/mod.rs

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::autograd::graph::NodeId;
use crate::device::StorageDevice;
use crate::error::CurvatureError;
use crate::tensor_data::TensorData;

mod autograd_methods;
pub mod create;
pub mod utils;

pub use create::{diag, eye, full, full_like, ones, ones_like, randn, zeros, zeros_like, zeros_on};

/// Represents a multi-dimensional array of `f64` values.
///
/// `Tensor` wraps `Arc<RwLock<TensorData>>`:
/// 1.  **Shared Ownership:** clones are cheap and point to the same node, which
///     is what the autograd graph relies on for node identity.
/// 2.  **Interior Mutability:** autograd metadata (`requires_grad`, `grad`) can be
///     updated through a shared reference.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new CPU tensor from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `CurvatureError::TensorCreationError` if the data length does not
    /// match the product of the shape.
    pub fn new(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, CurvatureError> {
        Ok(Self::from_data(TensorData::new(data_vec, shape)?))
    }

    /// Creates a 0-dimensional tensor holding `value`.
    pub fn scalar(value: f64) -> Self {
        Self::from_data(TensorData::new_view(
            Arc::new(vec![value]),
            StorageDevice::CPU,
            Vec::new(),
        ))
    }

    pub(crate) fn from_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The guarded data holds plain values only, so a poisoned lock is recovered
    /// rather than propagated.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires a write lock on the tensor's data.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    /// Returns a copy of the data in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.read_data().buffer.as_ref().clone()
    }

    /// Shared handle on the underlying buffer.
    pub(crate) fn buffer(&self) -> Arc<Vec<f64>> {
        Arc::clone(&self.read_data().buffer)
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<f64, CurvatureError> {
        let guard = self.read_data();
        if guard.numel() != 1 {
            return Err(CurvatureError::shape_mismatch(&[], &guard.shape, "item"));
        }
        Ok(guard.buffer[0])
    }

    /// Reads the element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f64, CurvatureError> {
        let guard = self.read_data();
        if index.len() != guard.shape.len() {
            return Err(CurvatureError::RankMismatch {
                expected: guard.shape.len(),
                actual: index.len(),
                operation: "get".to_string(),
            });
        }
        for (&i, &size) in index.iter().zip(guard.shape.iter()) {
            if i >= size {
                return Err(CurvatureError::IndexOutOfBounds {
                    index: i,
                    size,
                    operation: "get".to_string(),
                });
            }
        }
        let offset = utils::coord_to_index(index, &guard.shape);
        Ok(guard.buffer[offset])
    }

    /// Identity of this tensor as a node of the computation graph.
    pub(crate) fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }
}

impl Clone for Tensor {
    /// Shallow clone: both handles refer to the same graph node.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("data", &guard.buffer)
            .field("requires_grad", &guard.requires_grad)
            .finish()
    }
}
