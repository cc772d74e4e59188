use curvature_core::ops::arithmetic::{mul_op, mul_scalar_op};
use curvature_core::ops::linalg::einsum_op;
use curvature_core::ops::view::reshape_op;
use curvature_core::{CurvatureError, Tensor};

use super::{probe_count, Derivatives};
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::subsampling::subsample_input;

/// A scalar function applied element-wise, with its first two derivatives.
pub trait ElementwiseFunction: std::fmt::Debug + Clone + Send + Sync {
    fn name(&self) -> &'static str;

    fn hessian_is_zero(&self) -> bool;

    /// `f'` evaluated at every element of `input`.
    fn df(&self, input: &Tensor) -> Result<Tensor, CurvatureError>;

    /// `f''` evaluated at every element of `input`.
    fn d2f(&self, input: &Tensor) -> Result<Tensor, CurvatureError>;
}

/// Provider shared by all element-wise activations.
///
/// The Jacobian of an element-wise layer is `diag(f'(x))`, so every
/// Jacobian product is a broadcast multiplication of the probes by `f'`.
#[derive(Debug, Clone, Default)]
pub struct ElementwiseDerivatives<F> {
    function: F,
}

impl<F: ElementwiseFunction> ElementwiseDerivatives<F> {
    pub fn new(function: F) -> Self {
        ElementwiseDerivatives { function }
    }

    pub fn function(&self) -> &F {
        &self.function
    }

    /// `f'` at the recorded input, restricted to `subsampling`.
    pub fn df(&self, record: &ForwardRecord, subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
        let input = subsample_input(record, subsampling)?;
        Ok(self.function.df(&input)?)
    }

    pub fn d2f(&self, record: &ForwardRecord, subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
        let input = subsample_input(record, subsampling)?;
        Ok(self.function.d2f(&input)?)
    }

    fn scale_probes(&self, mat: &Tensor, df: &Tensor, operation: &str) -> Result<Tensor, DerivativesError> {
        let v = probe_count(mat, &df.shape(), operation)?;
        let f = df.numel();
        let flat = reshape_op(mat, vec![v, f])?;
        let scaled = einsum_op("vf,f->vf", &[&flat, &reshape_op(df, vec![f])?])?;
        Ok(reshape_op(&scaled, mat.shape())?)
    }
}

impl<F: ElementwiseFunction> Derivatives for ElementwiseDerivatives<F> {
    fn name(&self) -> &'static str {
        self.function.name()
    }

    fn hessian_is_zero(&self) -> bool {
        self.function.hessian_is_zero()
    }

    fn hessian_is_diagonal(&self) -> bool {
        true
    }

    fn jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let df = self.df(record, None)?;
        self.scale_probes(mat, &df, "jac_mat_prod")
    }

    fn jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let df = self.df(record, subsampling)?;
        self.scale_probes(mat, &df, "jac_t_mat_prod")
    }

    fn ea_jac_t_mat_jac_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let df = self.df(record, None)?;
        let shape = df.shape();
        let n = record.batch_size()?;
        let features = df.numel() / n.max(1);
        if mat.shape() != [features, features] {
            return Err(CurvatureError::shape_mismatch(&[features, features], &mat.shape(), "ea_jac_t_mat_jac_prod").into());
        }
        let df_flat = reshape_op(&df, vec![shape[0], features])?;
        let summed = einsum_op("ni,nj,ij->ij", &[&df_flat, &df_flat, mat])?;
        Ok(mul_scalar_op(&summed, 1.0 / n as f64)?)
    }

    fn hessian_diagonal(&self, record: &ForwardRecord, grad_output: &Tensor) -> Result<Tensor, DerivativesError> {
        let d2f = self.d2f(record, None)?;
        if grad_output.shape() != d2f.shape() {
            return Err(CurvatureError::shape_mismatch(&d2f.shape(), &grad_output.shape(), "hessian_diagonal").into());
        }
        Ok(mul_op(&d2f, grad_output)?)
    }
}
