use curvature_core::ops::view::reshape_op;
use curvature_core::{CurvatureError, Tensor};

use super::{probe_count, with_batch, Derivatives};
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::subsampling::subsampled_batch_size;

/// Provider for `View` and `Flatten`: the Jacobian is a permutation-free
/// reshape, so every product reshapes the probes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewDerivatives;

impl ViewDerivatives {
    /// A view keeps samples apart iff input and output share the batch axis.
    fn is_batch_preserving(record: &ForwardRecord) -> bool {
        let in_shape = record.input().shape();
        let out_shape = record.output().shape();
        !in_shape.is_empty() && !out_shape.is_empty() && in_shape[0] == out_shape[0]
    }

    fn reshape_probes(mat: &Tensor, from: &[usize], to: &[usize], operation: &str) -> Result<Tensor, DerivativesError> {
        let v = probe_count(mat, from, operation)?;
        let mut shape = vec![v];
        shape.extend_from_slice(to);
        Ok(reshape_op(mat, shape)?)
    }
}

impl Derivatives for ViewDerivatives {
    fn name(&self) -> &'static str {
        "ViewDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        true
    }

    fn jac_mat_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Self::reshape_probes(mat, &record.input().shape(), &record.output().shape(), "jac_mat_prod")
    }

    fn jac_t_mat_prod(
        &self,
        record: &ForwardRecord,
        mat: &Tensor,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let in_shape = record.input().shape();
        let out_shape = record.output().shape();
        if subsampling.is_none() {
            return Self::reshape_probes(mat, &out_shape, &in_shape, "jac_t_mat_prod");
        }
        if !Self::is_batch_preserving(record) {
            return Err(CurvatureError::UnsupportedOperation(format!(
                "jac_t_mat_prod: cannot subsample a view that mixes the batch axis ({:?} -> {:?})",
                in_shape, out_shape
            ))
            .into());
        }
        let n = subsampled_batch_size(in_shape[0], subsampling);
        Self::reshape_probes(
            mat,
            &with_batch(&out_shape, n),
            &with_batch(&in_shape, n),
            "jac_t_mat_prod",
        )
    }

    fn ea_jac_t_mat_jac_prod(&self, record: &ForwardRecord, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        if !Self::is_batch_preserving(record) {
            return Err(CurvatureError::UnsupportedOperation(
                "ea_jac_t_mat_jac_prod: view mixes the batch axis".to_string(),
            )
            .into());
        }
        let features: usize = record.output().shape()[1..].iter().product();
        if mat.shape() != [features, features] {
            return Err(CurvatureError::shape_mismatch(&[features, features], &mat.shape(), "ea_jac_t_mat_jac_prod").into());
        }
        Ok(mat.clone())
    }

    /// A reshape keeps the flat element order, so the Hessian is unchanged.
    fn backward_hessian(
        &self,
        record: &ForwardRecord,
        output_hessian: &Tensor,
        _grad_output: Option<&Tensor>,
    ) -> Result<Tensor, DerivativesError> {
        let k = record.input().numel();
        if output_hessian.shape() != [k, k] {
            return Err(CurvatureError::shape_mismatch(&[k, k], &output_hessian.shape(), "backward_hessian").into());
        }
        Ok(output_hessian.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvature_core::nn::{Flatten, View};
    use curvature_core::tensor::zeros;

    fn record(module: crate::module::SupportedModule, shape: &[usize]) -> ForwardRecord {
        ForwardRecord::capture(&module, &zeros(shape).unwrap(), None).unwrap()
    }

    #[test]
    fn test_flatten_jacobians_reshape() {
        let rec = record(Flatten::new().into(), &[2, 3, 2]);
        let mat = Tensor::new((0..24).map(f64::from).collect(), vec![2, 2, 3, 2]).unwrap();
        let out = ViewDerivatives.jac_mat_prod(&rec, &mat).unwrap();
        assert_eq!(out.shape(), vec![2, 2, 6]);
        assert_eq!(out.to_vec(), mat.to_vec());

        let back = ViewDerivatives.jac_t_mat_prod(&rec, &out, Some(&[1])).unwrap_err();
        assert!(matches!(back, DerivativesError::Tensor(CurvatureError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_subsampling_a_batch_mixing_view_is_rejected() {
        let rec = record(View::new(vec![-1, 3]).unwrap().into(), &[2, 6]);
        assert_eq!(rec.output().shape(), vec![4, 3]);
        let mat = zeros(&[1, 1, 3]).unwrap();
        let result = ViewDerivatives.jac_t_mat_prod(&rec, &mat, Some(&[0]));
        assert!(matches!(
            result,
            Err(DerivativesError::Tensor(CurvatureError::UnsupportedOperation(_)))
        ));
    }
}
