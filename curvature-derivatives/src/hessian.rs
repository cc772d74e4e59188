//! Assembling per-sample loss Hessians into batch-level matrices.

use curvature_core::ops::linalg::einsum_op;
use curvature_core::ops::view::index_select_op;
use curvature_core::tensor::zeros_on;
use curvature_core::{CurvatureError, Tensor};
use log::debug;

use crate::error::DerivativesError;

/// Per-sample Hessians `[n, F, F]` from a factorization `[R, n, F]`.
pub fn sample_hessians_from_sqrt(sqrt: &Tensor) -> Result<Tensor, DerivativesError> {
    let rank = sqrt.rank();
    if rank != 3 {
        return Err(DerivativesError::UnsupportedInputRank {
            expected: 3,
            actual: rank,
            operation: "sample_hessians_from_sqrt".to_string(),
        });
    }
    Ok(einsum_op("vni,vnj->nij", &[sqrt, sqrt])?)
}

/// Places per-sample Hessians `[N, F, F]` on the diagonal blocks of the
/// batch Hessian `[N, F, N, F]` of a `[N, F]` input.
///
/// Samples do not interact through a loss, so off-diagonal blocks are zero.
/// The result is zero-initialised on the device of `input`. Only 2-D inputs
/// are supported.
pub fn embed_sample_hessians(individual: &Tensor, input: &Tensor) -> Result<Tensor, DerivativesError> {
    let input_shape = input.shape();
    if input_shape.len() != 2 {
        return Err(DerivativesError::UnsupportedInputRank {
            expected: 2,
            actual: input_shape.len(),
            operation: "embed_sample_hessians".to_string(),
        });
    }
    let (n, f) = (input_shape[0], input_shape[1]);
    if individual.shape() != [n, f, f] {
        return Err(CurvatureError::shape_mismatch(&[n, f, f], &individual.shape(), "embed_sample_hessians").into());
    }
    debug!("embed_sample_hessians: {} blocks of size {}", n, f);

    let blocks = individual.to_vec();
    let mut data = zeros_on(&[n, f, n, f], input.device())?.to_vec();
    for (sample, block) in blocks.chunks(f * f).enumerate() {
        for (i, row) in block.chunks(f).enumerate() {
            let start = ((sample * f + i) * n + sample) * f;
            data[start..start + f].copy_from_slice(row);
        }
    }
    Ok(Tensor::new(data, vec![n, f, n, f])?)
}

/// Restricts a batch Hessian `[N, F, N, F]` to the samples in `subsampling`.
pub fn select_blocks(hessian: &Tensor, subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
    let rank = hessian.rank();
    if rank != 4 {
        return Err(DerivativesError::UnsupportedInputRank {
            expected: 4,
            actual: rank,
            operation: "select_blocks".to_string(),
        });
    }
    match subsampling {
        None => Ok(hessian.clone()),
        Some(indices) => {
            let rows = index_select_op(hessian, 0, indices)?;
            Ok(index_select_op(&rows, 2, indices)?)
        }
    }
}

/// Sum of the diagonal blocks of `[N, F, N, F]`, giving `[F, F]`.
pub fn sum_diagonal_blocks(hessian: &Tensor) -> Result<Tensor, DerivativesError> {
    let rank = hessian.rank();
    if rank != 4 {
        return Err(DerivativesError::UnsupportedInputRank {
            expected: 4,
            actual: rank,
            operation: "sum_diagonal_blocks".to_string(),
        });
    }
    Ok(einsum_op("ninj->ij", &[hessian])?)
}

#[cfg(test)]
#[path = "hessian_test.rs"]
mod tests;
