use curvature_core::autograd::{exact_hessian, grad, GradModeGuard};
use curvature_core::ops::view::reshape_op;
use curvature_core::{CurvatureError, Tensor};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::implementation::DerivativesImplementation;
use super::problem::{example_loss, DerivativesTestProblem};
use crate::derivatives::Derivatives;
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::hessian::{embed_sample_hessians, sample_hessians_from_sqrt};
use crate::subsampling::subsample_input;

/// Computes every oracle quantity with the problem's derivative provider.
///
/// The forward pass is re-run before each operation so every call sees a
/// fresh record. Sampled factorizations draw from a generator seeded with
/// `mc_seed`.
#[derive(Debug, Clone)]
pub struct ProviderDerivatives {
    problem: DerivativesTestProblem,
    mc_seed: u64,
}

impl ProviderDerivatives {
    pub fn new(problem: DerivativesTestProblem) -> Self {
        let mc_seed = problem.seed;
        ProviderDerivatives { problem, mc_seed }
    }

    pub fn with_mc_seed(mut self, mc_seed: u64) -> Self {
        self.mc_seed = mc_seed;
        self
    }

    fn record(&self) -> Result<ForwardRecord, DerivativesError> {
        self.problem.forward_pass()
    }
}

impl DerivativesImplementation for ProviderDerivatives {
    fn name(&self) -> &'static str {
        "ProviderDerivatives"
    }

    fn problem(&self) -> &DerivativesTestProblem {
        &self.problem
    }

    fn jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.problem.derivatives().jac_mat_prod(&self.record()?, mat)
    }

    fn jac_t_mat_prod(&self, mat: &Tensor, subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
        self.problem
            .derivatives()
            .jac_t_mat_prod(&self.record()?, mat, subsampling)
    }

    fn weight_jac_t_mat_prod(
        &self,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        self.problem
            .derivatives()
            .weight_jac_t_mat_prod(&self.record()?, mat, sum_batch, subsampling)
    }

    fn bias_jac_t_mat_prod(
        &self,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        self.problem
            .derivatives()
            .bias_jac_t_mat_prod(&self.record()?, mat, sum_batch, subsampling)
    }

    fn weight_jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.problem.derivatives().weight_jac_mat_prod(&self.record()?, mat)
    }

    fn bias_jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.problem.derivatives().bias_jac_mat_prod(&self.record()?, mat)
    }

    fn ea_jac_t_mat_jac_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.problem.derivatives().ea_jac_t_mat_jac_prod(&self.record()?, mat)
    }

    fn sum_hessian(&self) -> Result<Tensor, DerivativesError> {
        self.problem.derivatives().sum_hessian(&self.record()?)
    }

    fn input_hessian_via_sqrt_hessian(
        &self,
        mc_samples: Option<usize>,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let record = self.record()?;
        let provider = self.problem.derivatives();
        let sqrt = match mc_samples {
            None => provider.sqrt_hessian(&record, subsampling)?,
            Some(mc_samples) => {
                let mut rng = StdRng::seed_from_u64(self.mc_seed);
                provider.sqrt_hessian_sampled(&record, mc_samples, subsampling, &mut rng)?
            }
        };
        let individual = sample_hessians_from_sqrt(&sqrt)?;
        let embedded = embed_sample_hessians(&individual, &subsample_input(&record, subsampling)?)?;
        let shape = embedded.shape();
        let side = shape[0] * shape[1];
        Ok(reshape_op(&embedded, vec![side, side])?)
    }

    /// Seeds the backward pass with the exact output Hessian and gradient of
    /// `Σ out²`, then lets the provider map them to the input.
    fn input_hessian_via_backward_hessian(&self) -> Result<Tensor, DerivativesError> {
        let record = self.record()?;
        let (output_hessian, grad_output) = {
            let _mode = GradModeGuard::new(true);
            let output = record.output().detach();
            output.set_requires_grad(true)?;
            let objective = example_loss(&output)?;
            let output_hessian = exact_hessian(&objective, &output)?;
            let grad_output = grad(&objective, &[output], None, false)?
                .pop()
                .ok_or_else(|| CurvatureError::InternalError("grad returned no gradient".to_string()))?;
            (output_hessian, grad_output)
        };
        debug!(
            "{}: backward_hessian from output Hessian {:?}",
            self.problem.id,
            output_hessian.shape()
        );
        self.problem
            .derivatives()
            .backward_hessian(&record, &output_hessian, Some(&grad_output))
    }

    fn hessian_is_zero(&self) -> Result<bool, DerivativesError> {
        Ok(self.problem.derivatives().hessian_is_zero())
    }
}
