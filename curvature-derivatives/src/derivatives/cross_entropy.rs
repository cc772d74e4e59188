use curvature_core::nn::Reduction;
use curvature_core::ops::arithmetic::{mul_scalar_op, sub_op};
use curvature_core::ops::linalg::einsum_op;
use curvature_core::ops::math_elem::sqrt_op;
use curvature_core::tensor::eye;
use curvature_core::Tensor;
use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

use super::Derivatives;
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::subsampling::subsample_input;

/// Row-wise softmax of `[N, C]` logits, shifted by the row maximum.
pub fn softmax(logits: &Tensor) -> Result<Tensor, DerivativesError> {
    let shape = logits.shape();
    if shape.len() != 2 {
        return Err(DerivativesError::UnsupportedInputRank {
            expected: 2,
            actual: shape.len(),
            operation: "softmax".to_string(),
        });
    }
    let classes = shape[1];
    let mut data = logits.to_vec();
    for row in data.chunks_mut(classes.max(1)) {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut total = 0.0;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            total += *v;
        }
        for v in row.iter_mut() {
            *v /= total;
        }
    }
    Ok(Tensor::new(data, shape)?)
}

/// Provider for `CrossEntropyLoss` on `[N, C]` logits.
///
/// With `p = softmax(x)` the per-sample Hessian is `c · (diag(p) − p pᵀ)`,
/// where `c = 1` for `Sum` and `c = 1 / N` for `Mean`. It does not depend on
/// the target class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossEntropyLossDerivatives {
    reduction: Reduction,
}

impl CrossEntropyLossDerivatives {
    pub fn new(reduction: Reduction) -> Self {
        CrossEntropyLossDerivatives { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    fn scale(&self, record: &ForwardRecord) -> Result<f64, DerivativesError> {
        Ok(match self.reduction {
            Reduction::Sum => 1.0,
            Reduction::Mean => 1.0 / record.batch_size()? as f64,
        })
    }
}

impl Derivatives for CrossEntropyLossDerivatives {
    fn name(&self) -> &'static str {
        "CrossEntropyLossDerivatives"
    }

    fn hessian_is_zero(&self) -> bool {
        false
    }

    fn sum_hessian(&self, record: &ForwardRecord) -> Result<Tensor, DerivativesError> {
        let probs = softmax(record.input())?;
        let classes = probs.shape()[1];
        let diagonal = einsum_op("ni,ij->ij", &[&probs, &eye(classes)?])?;
        let outer = einsum_op("ni,nj->ij", &[&probs, &probs])?;
        Ok(mul_scalar_op(&sub_op(&diagonal, &outer)?, self.scale(record)?)?)
    }

    fn sqrt_hessian(
        &self,
        record: &ForwardRecord,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let probs = softmax(&subsample_input(record, subsampling)?)?;
        let classes = probs.shape()[1];
        let sqrt_probs = sqrt_op(&probs)?;
        let diagonal = einsum_op("nk,ki->kni", &[&sqrt_probs, &eye(classes)?])?;
        let outer = einsum_op("nk,ni->kni", &[&sqrt_probs, &probs])?;
        Ok(mul_scalar_op(&sub_op(&diagonal, &outer)?, self.scale(record)?.sqrt())?)
    }

    /// Rows `(p − e_y) / √mc` with `y` drawn from the model's own
    /// predictive distribution.
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
        let probs = softmax(&subsample_input(record, subsampling)?)?;
        let shape = probs.shape();
        let (n, classes) = (shape[0], shape[1]);
        if classes == 0 {
            return Err(DerivativesError::InvalidArgument(
                "sqrt_hessian_sampled: logits have no classes".to_string(),
            ));
        }
        let weight = (self.scale(record)? / mc_samples as f64).sqrt();
        debug!(
            "CrossEntropyLossDerivatives: drawing {} MC samples for {} inputs",
            mc_samples, n
        );

        let rows = probs.to_vec();
        let distributions = rows
            .chunks(classes)
            .map(WeightedIndex::<f64>::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DerivativesError::InvalidArgument(format!("sqrt_hessian_sampled: {}", e)))?;

        let mut data = Vec::with_capacity(mc_samples * n * classes);
        for _ in 0..mc_samples {
            for (row, distribution) in rows.chunks(classes).zip(&distributions) {
                let label = distribution.sample(&mut *rng);
                data.extend(row.iter().enumerate().map(|(c, &p)| {
                    let onehot = if c == label { 1.0 } else { 0.0 };
                    (p - onehot) * weight
                }));
            }
        }
        Ok(Tensor::new(data, vec![mc_samples, n, classes])?)
    }
}

#[cfg(test)]
#[path = "cross_entropy_test.rs"]
mod tests;
