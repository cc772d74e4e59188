use curvature_core::Tensor;

use super::problem::DerivativesTestProblem;
use crate::derivatives::not_implemented;
use crate::error::DerivativesError;

/// A way of computing every oracle quantity for one problem.
///
/// Shapes follow the provider conventions; input Hessians are returned as
/// square matrices over the flattened (possibly subsampled) input.
pub trait DerivativesImplementation {
    fn name(&self) -> &'static str;

    fn problem(&self) -> &DerivativesTestProblem;

    fn jac_mat_prod(&self, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "jac_mat_prod"))
    }

    fn jac_t_mat_prod(&self, _mat: &Tensor, _subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "jac_t_mat_prod"))
    }

    fn weight_jac_t_mat_prod(
        &self,
        _mat: &Tensor,
        _sum_batch: bool,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "weight_jac_t_mat_prod"))
    }

    fn bias_jac_t_mat_prod(
        &self,
        _mat: &Tensor,
        _sum_batch: bool,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "bias_jac_t_mat_prod"))
    }

    fn weight_jac_mat_prod(&self, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "weight_jac_mat_prod"))
    }

    fn bias_jac_mat_prod(&self, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "bias_jac_mat_prod"))
    }

    fn ea_jac_t_mat_jac_prod(&self, _mat: &Tensor) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "ea_jac_t_mat_jac_prod"))
    }

    /// Batch sum of the per-sample Hessian blocks of the problem's loss.
    fn sum_hessian(&self) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "sum_hessian"))
    }

    /// Loss Hessian w.r.t. the selected samples, `[n·F, n·F]`. `mc_samples`
    /// switches the provider to its sampled factorization.
    fn input_hessian_via_sqrt_hessian(
        &self,
        _mc_samples: Option<usize>,
        _subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "input_hessian_via_sqrt_hessian"))
    }

    /// Hessian of `Σ out²` w.r.t. the layer input, `[K, K]`.
    fn input_hessian_via_backward_hessian(&self) -> Result<Tensor, DerivativesError> {
        Err(not_implemented(self.name(), "input_hessian_via_backward_hessian"))
    }

    /// Whether the layer output is affine in its input.
    fn hessian_is_zero(&self) -> Result<bool, DerivativesError> {
        Err(not_implemented(self.name(), "hessian_is_zero"))
    }
}
