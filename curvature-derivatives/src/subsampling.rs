use curvature_core::ops::view::index_select_op;
use curvature_core::Tensor;
use log::debug;

use crate::error::DerivativesError;
use crate::forward::ForwardRecord;

/// Selects the rows `subsampling` of `tensor` along axis `dim`, in order.
///
/// `None` returns the tensor unchanged. Indices outside the axis fail with
/// `IndexOutOfBounds`; nothing is clamped.
pub fn subsample(
    tensor: &Tensor,
    dim: usize,
    subsampling: Option<&[usize]>,
) -> Result<Tensor, DerivativesError> {
    match subsampling {
        None => Ok(tensor.clone()),
        Some(indices) => {
            debug!(
                "subsample: {} of {:?} along axis {}",
                indices.len(),
                tensor.shape(),
                dim
            );
            Ok(index_select_op(tensor, dim, indices)?)
        }
    }
}

/// The recorded input restricted to the samples in `subsampling`.
pub fn subsample_input(
    record: &ForwardRecord,
    subsampling: Option<&[usize]>,
) -> Result<Tensor, DerivativesError> {
    subsample(record.input(), 0, subsampling)
}

/// Number of samples selected from a batch of `batch_size`.
pub fn subsampled_batch_size(batch_size: usize, subsampling: Option<&[usize]>) -> usize {
    subsampling.map_or(batch_size, <[usize]>::len)
}

#[cfg(test)]
#[path = "subsampling_test.rs"]
mod tests;
