use crate::error::CurvatureError;
use crate::nn::losses::{Loss, Reduction};
use crate::ops::arithmetic::{add_op, mul_op, mul_scalar_op, sub_op};
use crate::ops::math_elem::{exp_op, ln_op};
use crate::ops::reduction::{sum_all_op, sum_dim_op};
use crate::ops::view::expand_dim_op;
use crate::tensor::Tensor;

/// Encodes class indices stored as `f64` in an `[N]` tensor as an `[N, C]`
/// indicator matrix.
///
/// # Errors
/// * `RankMismatch` if `target` is not 1-D.
/// * `UnsupportedOperation` for negative or fractional class indices.
/// * `IndexOutOfBounds` for indices `>= num_classes`.
pub fn one_hot(target: &Tensor, num_classes: usize) -> Result<Tensor, CurvatureError> {
    let shape = target.shape();
    if shape.len() != 1 {
        return Err(CurvatureError::RankMismatch {
            expected: 1,
            actual: shape.len(),
            operation: "one_hot".to_string(),
        });
    }
    let classes = target.to_vec();
    let mut data = vec![0.0; classes.len() * num_classes];
    for (n, &class) in classes.iter().enumerate() {
        if class < 0.0 || class.fract() != 0.0 {
            return Err(CurvatureError::UnsupportedOperation(format!(
                "class index {} is not a non-negative integer",
                class
            )));
        }
        let class = class as usize;
        if class >= num_classes {
            return Err(CurvatureError::IndexOutOfBounds {
                index: class,
                size: num_classes,
                operation: "one_hot".to_string(),
            });
        }
        data[n * num_classes + class] = 1.0;
    }
    Tensor::new(data, vec![classes.len(), num_classes])
}

/// `log Σ_c exp(x_c)` per row of `[N, C]` logits, shifted by the row maximum.
///
/// The shift is a constant, so gradients match the unshifted expression.
pub fn log_sum_exp(input: &Tensor) -> Result<Tensor, CurvatureError> {
    let shape = input.shape();
    if shape.len() != 2 {
        return Err(CurvatureError::RankMismatch {
            expected: 2,
            actual: shape.len(),
            operation: "log_sum_exp".to_string(),
        });
    }
    let (rows, classes) = (shape[0], shape[1]);
    let maxima: Vec<f64> = if classes == 0 {
        vec![0.0; rows]
    } else {
        input
            .to_vec()
            .chunks(classes)
            .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    };
    let shift = Tensor::new(maxima, vec![rows])?;
    let shifted = sub_op(input, &expand_dim_op(&shift, 1, classes)?)?;
    add_op(&ln_op(&sum_dim_op(&exp_op(&shifted)?, 1)?)?, &shift)
}

/// Softmax cross-entropy between `[N, C]` logits and `[N]` class indices.
///
/// Per sample: `log Σ_c exp(x_c) - x_y`. `Mean` divides the sum by `N`.
#[derive(Debug, Clone, Default)]
pub struct CrossEntropyLoss {
    reduction: Reduction,
}

impl CrossEntropyLoss {
    pub fn new(reduction: Reduction) -> Self {
        CrossEntropyLoss { reduction }
    }
}

impl Loss for CrossEntropyLoss {
    fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, CurvatureError> {
        let shape = input.shape();
        if shape.len() != 2 {
            return Err(CurvatureError::RankMismatch {
                expected: 2,
                actual: shape.len(),
                operation: "CrossEntropyLoss calculate".to_string(),
            });
        }
        if target.shape() != [shape[0]] {
            return Err(CurvatureError::shape_mismatch(
                &[shape[0]],
                &target.shape(),
                "CrossEntropyLoss calculate",
            ));
        }
        let indicator = one_hot(target, shape[1])?;
        let log_normalizer = log_sum_exp(input)?;
        let picked = sum_dim_op(&mul_op(input, &indicator)?, 1)?;
        let total = sum_all_op(&sub_op(&log_normalizer, &picked)?)?;
        match self.reduction {
            Reduction::Sum => Ok(total),
            Reduction::Mean => mul_scalar_op(&total, 1.0 / shape[0] as f64),
        }
    }

    fn reduction(&self) -> Reduction {
        self.reduction
    }
}

#[cfg(test)]
#[path = "cross_entropy_test.rs"]
mod tests;
