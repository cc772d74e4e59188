//! Derivative providers: closed-form first- and second-order quantities per
//! layer type.
//!
//! Every operation takes the [`ForwardRecord`] of the pass it differentiates.
//! Probe matrices carry a leading axis `V` of independent vectors:
//! `[V, N, *out]` for output-side probes and `[V, N, *in]` for input-side
//! probes. Operations a provider does not support fail with
//! [`DerivativesError::NotImplemented`].

use curvature_core::ops::arithmetic::add_op;
use curvature_core::ops::view::{reshape_op, transpose_op};
use curvature_core::tensor::diag;
use curvature_core::{CurvatureError, Tensor};
use log::debug;
use rand::RngCore;

use crate::error::DerivativesError;
use crate::forward::ForwardRecord;

pub mod cross_entropy;
pub mod elementwise;
pub mod linear;
pub mod mse;
pub mod relu;
pub mod selu;
pub mod view;

pub use cross_entropy::CrossEntropyLossDerivatives;
pub use elementwise::{ElementwiseDerivatives, ElementwiseFunction};
pub use linear::LinearDerivatives;
pub use mse::MSELossDerivatives;
pub use relu::{ReLUDerivatives, ReLUFunction};
pub use selu::{SELUDerivatives, SELUFunction};
pub use view::ViewDerivatives;

pub(crate) fn not_implemented(provider: &str, operation: &str) -> DerivativesError {
    DerivativesError::NotImplemented {
        operation: operation.to_string(),
        provider: provider.to_string(),
    }
}

/// Checks that `mat` is `[V, *tail]` and returns `V`.
pub(crate) fn probe_count(mat: &Tensor, tail: &[usize], operation: &str) -> Result<usize, DerivativesError> {
    let shape = mat.shape();
    if shape.len() != tail.len() + 1 || shape[1..] != *tail {
        let mut expected = vec![shape.first().copied().unwrap_or(0)];
        expected.extend_from_slice(tail);
        return Err(CurvatureError::shape_mismatch(&expected, &shape, operation).into());
    }
    Ok(shape[0])
}

/// Replaces the leading axis of `shape` by `batch`.
pub(crate) fn with_batch(shape: &[usize], batch: usize) -> Vec<usize> {
    let mut out = shape.to_vec();
    if let Some(first) = out.first_mut() {
        *first = batch;
    }
    out
}

/// First- and second-order derivative formulas of one layer type.
pub trait Derivatives: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// `true` if the layer's output is affine in its input.
    fn hessian_is_zero(&self) -> bool;

    /// `true` if the layer's input Hessian is diagonal (element-wise layers).
    fn hessian_is_diagonal(&self) -> bool {
        false
    }

    /// Applies the input-output Jacobian: `[V, N, *in] -> [V, N, *out]`.
    fn jac_mat_prod(&self, _record: &ForwardRecord, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "jac_mat_prod"))
    }

    /// Applies the transposed Jacobian: `[V, n, *out] -> [V, n, *in]`, where
    /// `n` is the number of samples selected by `subsampling`.
    fn jac_t_mat_prod(
        &self,
        _record: &ForwardRecord,
        _mat: &Tensor,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "jac_t_mat_prod"))
    }

    /// Transposed output-weight Jacobian: `[V, n, *out] -> [V, *w]` if
    /// `sum_batch`, else `[V, n, *w]`.
    fn weight_jac_t_mat_prod(
        &self,
        _record: &ForwardRecord,
        _mat: &Tensor,
        _sum_batch: bool,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "weight_jac_t_mat_prod"))
    }

    fn bias_jac_t_mat_prod(
        &self,
        _record: &ForwardRecord,
        _mat: &Tensor,
        _sum_batch: bool,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "bias_jac_t_mat_prod"))
    }

    /// Output-weight Jacobian: `[V, *w] -> [V, N, *out]`.
    fn weight_jac_mat_prod(&self, _record: &ForwardRecord, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "weight_jac_mat_prod"))
    }

    fn bias_jac_mat_prod(&self, _record: &ForwardRecord, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "bias_jac_mat_prod"))
    }

    /// Batch-averaged `Jₙᵀ M Jₙ` for a per-sample output matrix `M`.
    fn ea_jac_t_mat_jac_prod(&self, _record: &ForwardRecord, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "ea_jac_t_mat_jac_prod"))
    }

    /// Diagonal of the residual term `Σₘ gₘ ∇²outₘ`, shaped like the input.
    fn hessian_diagonal(
        &self,
        _record: &ForwardRecord,
        _grad_output: &Tensor,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "hessian_diagonal"))
    }

    /// Batch sum of the per-sample loss Hessians, `[F, F]`.
    fn sum_hessian(&self, _record: &ForwardRecord) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "sum_hessian"))
    }

    /// Exact symmetric factorization `S` of the per-sample loss Hessians,
    /// shaped `[R, n, F]` so that `Σᵣ S[r, i] S[r, i]ᵀ = Hᵢ`.
    fn sqrt_hessian(
        &self,
        _record: &ForwardRecord,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "sqrt_hessian"))
    }

    /// Monte-Carlo factorization with `mc_samples` rows whose expected outer
    /// product equals the per-sample loss Hessian.
    fn sqrt_hessian_sampled(
        &self,
        _record: &ForwardRecord,
        _mc_samples: usize,
        _subsampling: Option<&[usize]>,
        _rng: &mut dyn RngCore,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "sqrt_hessian_sampled"))
    }

    /// Maps the Hessian w.r.t. the output (`[M, M]`) to the Hessian w.r.t. the
    /// input (`[K, K]`).
    fn backward_hessian(
        &self,
        record: &ForwardRecord,
        output_hessian: &Tensor,
        grad_output: Option<&Tensor>,
    ) -> Result<Tensor, DerivativesError> {
        backward_hessian_by_contraction(self, record, output_hessian, grad_output)
    }
}

/// `Jᵀ H J` through two transposed-Jacobian applications, plus the residual
/// `diag(Σₘ gₘ ∇²outₘ)` for element-wise layers with a non-zero Hessian.
pub fn backward_hessian_by_contraction<D: Derivatives + ?Sized>(
    provider: &D,
    record: &ForwardRecord,
    output_hessian: &Tensor,
    grad_output: Option<&Tensor>,
) -> Result<Tensor, DerivativesError> {
    let in_shape = record.input().shape();
    let out_shape = record.output().shape();
    let m: usize = out_shape.iter().product();
    let k: usize = in_shape.iter().product();
    if output_hessian.shape() != [m, m] {
        return Err(CurvatureError::shape_mismatch(&[m, m], &output_hessian.shape(), "backward_hessian").into());
    }
    debug!(
        "{}: backward_hessian {:?} -> {:?}",
        provider.name(),
        out_shape,
        in_shape
    );

    let mut probes_shape = vec![m];
    probes_shape.extend_from_slice(&out_shape);
    let h_j = provider.jac_t_mat_prod(record, &reshape_op(output_hessian, probes_shape)?, None)?;
    let j_t_h = transpose_op(&reshape_op(&h_j, vec![m, k])?)?;

    let mut probes_shape = vec![k];
    probes_shape.extend_from_slice(&out_shape);
    let j_t_h_j = provider.jac_t_mat_prod(record, &reshape_op(&j_t_h, probes_shape)?, None)?;
    let j_t_h_j = reshape_op(&j_t_h_j, vec![k, k])?;

    if provider.hessian_is_zero() {
        return Ok(j_t_h_j);
    }
    if !provider.hessian_is_diagonal() {
        return Err(not_implemented(provider.name(), "backward_hessian residual"));
    }
    let grad_output = grad_output.ok_or_else(|| {
        DerivativesError::InvalidArgument(format!(
            "{}: backward_hessian needs the output gradient for the residual term",
            provider.name()
        ))
    })?;
    let residual = provider.hessian_diagonal(record, grad_output)?;
    let residual = diag(&reshape_op(&residual, vec![k])?)?;
    Ok(add_op(&j_t_h_j, &residual)?)
}

/// One provider per supported layer type.
#[derive(Debug, Clone)]
pub enum DerivativesKind {
    Linear(LinearDerivatives),
    ReLU(ReLUDerivatives),
    SELU(SELUDerivatives),
    View(ViewDerivatives),
    MSELoss(MSELossDerivatives),
    CrossEntropyLoss(CrossEntropyLossDerivatives),
}

macro_rules! dispatch {
    ($self:ident, $provider:ident => $call:expr) => {
        match $self {
            DerivativesKind::Linear($provider) => $call,
            DerivativesKind::ReLU($provider) => $call,
            DerivativesKind::SELU($provider) => $call,
            DerivativesKind::View($provider) => $call,
            DerivativesKind::MSELoss($provider) => $call,
            DerivativesKind::CrossEntropyLoss($provider) => $call,
        }
    };
}

impl Derivatives for DerivativesKind {
    fn name(&self) -> &'static str {
        dispatch!(self, d => d.name())
    }

    fn hessian_is_zero(&self) -> bool {
        dispatch!(self, d => d.hessian_is_zero())
    }

    fn hessian_is_diagonal(&self) -> bool {
        dispatch!(self, d => d.hessian_is_diagonal())
    }

    fn jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.jac_mat_prod(record, mat))
    }

    fn jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.jac_t_mat_prod(record, mat, subsampling))
    }

    fn weight_jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.weight_jac_t_mat_prod(record, mat, sum_batch, subsampling))
    }

    fn bias_jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.bias_jac_t_mat_prod(record, mat, sum_batch, subsampling))
    }

    fn weight_jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.weight_jac_mat_prod(record, mat))
    }

    fn bias_jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.bias_jac_mat_prod(record, mat))
    }

    fn ea_jac_t_mat_jac_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.ea_jac_t_mat_jac_prod(record, mat))
    }

    fn hessian_diagonal(&self, record: &ForwardRecord, grad_output: &Tensor) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.hessian_diagonal(record, grad_output))
    }

    fn sum_hessian(&self, record: &ForwardRecord) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.sum_hessian(record))
    }

    fn sqrt_hessian(
        &self,
        record: &ForwardRecord,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.sqrt_hessian(record, subsampling))
    }

    fn sqrt_hessian_sampled(
        &self,
        record: &ForwardRecord,
        mc_samples: usize,
        subsampling: Option<&[usize]>,
        rng: &mut dyn RngCore,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.sqrt_hessian_sampled(record, mc_samples, subsampling, rng))
    }

    fn backward_hessian(
        &self,
        record: &ForwardRecord,
        output_hessian: &Tensor,
        grad_output: Option<&Tensor>,
    ) -> Result<Tensor, DerivativesError> {
        dispatch!(self, d => d.backward_hessian(record, output_hessian, grad_output))
    }
}
