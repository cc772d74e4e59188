use curvature_core::nn::Linear;
use curvature_core::ops::linalg::einsum_op;
use curvature_core::ops::reduction::sum_dim_op;
use curvature_core::ops::view::expand_dim_op;
use curvature_core::Tensor;

use super::{probe_count, Derivatives};
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::subsampling::{subsample_input, subsampled_batch_size};

/// Provider for `y = x Wᵀ + b` on `[N, I]` inputs.
///
/// Holds detached copies of the parameters taken when the provider was built.
#[derive(Debug, Clone)]
pub struct LinearDerivatives {
    weight: Tensor,
    bias: Option<Tensor>,
}

impl LinearDerivatives {
    pub fn new(weight: &Tensor, bias: Option<&Tensor>) -> Self {
        LinearDerivatives {
            weight: weight.detach(),
            bias: bias.map(Tensor::detach),
        }
    }

    pub fn from_layer(layer: &Linear) -> Self {
        Self::new(layer.weight().tensor(), layer.bias().map(|b| b.tensor()))
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    fn out_features(&self) -> usize {
        self.weight.shape()[0]
    }

    fn in_features(&self) -> usize {
        self.weight.shape()[1]
    }

    fn check_input(record: &ForwardRecord, operation: &str) -> Result<usize, DerivativesError> {
        let shape = record.input().shape();
        if shape.len() != 2 {
            return Err(DerivativesError::UnsupportedInputRank {
                expected: 2,
                actual: shape.len(),
                operation: operation.to_string(),
            });
        }
        Ok(shape[0])
    }

    fn require_bias(&self) -> Result<&Tensor, DerivativesError> {
        self.bias.as_ref().ok_or_else(|| DerivativesError::MissingParameter {
            parameter: "bias".to_string(),
            provider: self.name().to_string(),
        })
    }
}

impl Derivatives for LinearDerivatives {
    fn name(&self) -> &'static str {
        "LinearDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        true
    }

    fn jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let n = Self::check_input(record, "jac_mat_prod")?;
        probe_count(mat, &[n, self.in_features()], "jac_mat_prod")?;
        Ok(einsum_op("oi,vni->vno", &[&self.weight, mat])?)
    }

    fn jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let n = subsampled_batch_size(Self::check_input(record, "jac_t_mat_prod")?, subsampling);
        probe_count(mat, &[n, self.out_features()], "jac_t_mat_prod")?;
        Ok(einsum_op("oi,vno->vni", &[&self.weight, mat])?)
    }

    fn weight_jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Self::check_input(record, "weight_jac_t_mat_prod")?;
        let input = subsample_input(record, subsampling)?;
        probe_count(mat, &[input.shape()[0], self.out_features()], "weight_jac_t_mat_prod")?;
        let equation = if sum_batch { "vno,ni->voi" } else { "vno,ni->vnoi" };
        Ok(einsum_op(equation, &[mat, &input])?)
    }

    fn bias_jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        self.require_bias()?;
        let n = subsampled_batch_size(Self::check_input(record, "bias_jac_t_mat_prod")?, subsampling);
        probe_count(mat, &[n, self.out_features()], "bias_jac_t_mat_prod")?;
        if sum_batch {
            Ok(sum_dim_op(mat, 1)?)
        } else {
            Ok(mat.clone())
        }
    }

    fn weight_jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Self::check_input(record, "weight_jac_mat_prod")?;
        probe_count(mat, &self.weight.shape(), "weight_jac_mat_prod")?;
        Ok(einsum_op("ni,voi->vno", &[record.input(), mat])?)
    }

    fn bias_jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.require_bias()?;
        let n = Self::check_input(record, "bias_jac_mat_prod")?;
        probe_count(mat, &[self.out_features()], "bias_jac_mat_prod")?;
        Ok(expand_dim_op(mat, 1, n)?)
    }

    fn ea_jac_t_mat_jac_prod(&self, _record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let o = self.out_features();
        if mat.shape() != [o, o] {
            return Err(curvature_core::CurvatureError::shape_mismatch(&[o, o], &mat.shape(), "ea_jac_t_mat_jac_prod").into());
        }
        Ok(einsum_op("oi,op,pj->ij", &[&self.weight, mat, &self.weight])?)
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
