use curvature_core::nn::Reduction;
use curvature_core::ops::arithmetic::mul_scalar_op;
use curvature_core::ops::view::expand_dim_op;
use curvature_core::tensor::{eye, randn};
use curvature_core::Tensor;
use log::debug;
use rand::RngCore;

use super::Derivatives;
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::subsampling::subsampled_batch_size;

/// Provider for `MSELoss` on `[N, D]` predictions.
///
/// The per-sample Hessian is `2c · I` with `c = 1` for `Sum` and
/// `c = 1 / (N · D)` for `Mean`, independent of the prediction and target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MSELossDerivatives {
    reduction: Reduction,
}

impl MSELossDerivatives {
    pub fn new(reduction: Reduction) -> Self {
        MSELossDerivatives { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Returns `(N, D, c)` for the recorded predictions.
    fn dimensions(&self, record: &ForwardRecord, operation: &str) -> Result<(usize, usize, f64), DerivativesError> {
        let shape = record.input().shape();
        if shape.len() != 2 {
            return Err(DerivativesError::UnsupportedInputRank {
                expected: 2,
                actual: shape.len(),
                operation: operation.to_string(),
            });
        }
        let (n, d) = (shape[0], shape[1]);
        let scale = match self.reduction {
            Reduction::Sum => 1.0,
            Reduction::Mean => 1.0 / (n * d) as f64,
        };
        Ok((n, d, scale))
    }
}

impl Derivatives for MSELossDerivatives {
    fn name(&self) -> &'static str {
        "MSELossDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        false
    }

    fn sum_hessian(&self, record: &ForwardRecord) -> Result<Tensor, DerivativesError> {
        let (n, d, scale) = self.dimensions(record, "sum_hessian")?;
        Ok(mul_scalar_op(&eye(d)?, 2.0 * scale * n as f64)?)
    }

    fn sqrt_hessian(
        &self,
        record: &ForwardRecord,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let (n, d, scale) = self.dimensions(record, "sqrt_hessian")?;
        let n = subsampled_batch_size(n, subsampling);
        let factor = mul_scalar_op(&eye(d)?, (2.0 * scale).sqrt())?;
        Ok(expand_dim_op(&factor, 1, n)?)
    }

    fn sqrt_hessian_sampled(
        &self,
        record: &ForwardRecord,
        mc_samples: usize,
        subsampling: Option<&[usize]>,
        rng: &mut dyn RngCore,
    ) -> Result<Tensor, DerivativesError> {
        if mc_samples == 0 {
            return Err(DerivativesError::InvalidArgument(
                "sqrt_hessian_sampled: mc_samples must be positive".to_string(),
            ));
        }
        let (n, d, scale) = self.dimensions(record, "sqrt_hessian_sampled")?;
        let n = subsampled_batch_size(n, subsampling);
        debug!("MSELossDerivatives: drawing {} MC samples for {} inputs", mc_samples, n);
        let noise = randn(&[mc_samples, n, d], rng)?;
        Ok(mul_scalar_op(&noise, (2.0 * scale / mc_samples as f64).sqrt())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvature_core::nn::MSELoss;
    use curvature_core::tensor::zeros;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(reduction: Reduction) -> ForwardRecord {
        let input = zeros(&[3, 2]).unwrap();
        let target = zeros(&[3, 2]).unwrap();
        ForwardRecord::capture(&MSELoss::new(reduction).into(), &input, Some(&target)).unwrap()
    }

    #[test]
    fn test_sum_hessian() {
        let sum = MSELossDerivatives::new(Reduction::Sum).sum_hessian(&record(Reduction::Sum)).unwrap();
        assert_eq!(sum.to_vec(), vec![6.0, 0.0, 0.0, 6.0]);

        let mean = MSELossDerivatives::new(Reduction::Mean).sum_hessian(&record(Reduction::Mean)).unwrap();
        for (v, e) in mean.to_vec().iter().zip([1.0, 0.0, 0.0, 1.0]) {
            approx::assert_relative_eq!(*v, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sqrt_hessian_shape_and_values() {
        let provider = MSELossDerivatives::new(Reduction::Sum);
        let sqrt = provider.sqrt_hessian(&record(Reduction::Sum), Some(&[2, 0])).unwrap();
        assert_eq!(sqrt.shape(), vec![2, 2, 2]);
        let r = 2.0f64.sqrt();
        assert_eq!(sqrt.to_vec(), vec![r, 0.0, r, 0.0, 0.0, r, 0.0, r]);
    }

    #[test]
    fn test_zero_mc_samples() {
        let provider = MSELossDerivatives::new(Reduction::Sum);
        let mut rng = StdRng::seed_from_u64(0);
        let result = provider.sqrt_hessian_sampled(&record(Reduction::Sum), 0, None, &mut rng);
        assert!(matches!(result, Err(DerivativesError::InvalidArgument(_))));
    }
}
