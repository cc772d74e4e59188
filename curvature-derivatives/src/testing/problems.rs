//! Catalog of test problems covering every supported module.

use curvature_core::nn::{CrossEntropyLoss, Flatten, Linear, MSELoss, ReLU, Reduction, View, SELU};
use curvature_core::tensor::randn;
use curvature_core::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::problem::DerivativesTestProblem;
use crate::error::DerivativesError;

fn linear(in_features: usize, out_features: usize, has_bias: bool, seed: u64) -> Result<Linear, DerivativesError> {
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Linear::new(in_features, out_features, has_bias, &mut rng)?)
}

/// Problems for layers, i.e. modules without a target.
pub fn layer_problems() -> Result<Vec<DerivativesTestProblem>, DerivativesError> {
    Ok(vec![
        DerivativesTestProblem::new("linear", linear(4, 3, true, 11)?, &[3, 4], 0),
        DerivativesTestProblem::new("linear-no-bias", linear(4, 2, false, 12)?, &[3, 4], 1),
        DerivativesTestProblem::new("relu", ReLU::new(), &[3, 5], 2),
        DerivativesTestProblem::new("selu", SELU::new(), &[3, 5], 3),
        DerivativesTestProblem::new("view", View::new(vec![3, 2, 2])?, &[3, 4], 4),
        DerivativesTestProblem::new("view-batch-mixing", View::new(vec![-1, 3])?, &[2, 6], 5),
        DerivativesTestProblem::new("flatten", Flatten::new(), &[3, 2, 3], 6),
    ])
}

/// Problems for losses, each with a fixed target.
pub fn loss_problems() -> Result<Vec<DerivativesTestProblem>, DerivativesError> {
    let regression_target = randn(&[3, 4], &mut StdRng::seed_from_u64(100))?;
    let classes = Tensor::new(vec![2.0, 0.0, 3.0], vec![3])?;
    Ok(vec![
        DerivativesTestProblem::new("mse-sum", MSELoss::new(Reduction::Sum), &[3, 4], 7)
            .with_target(regression_target.clone()),
        DerivativesTestProblem::new("mse-mean", MSELoss::new(Reduction::Mean), &[3, 4], 8)
            .with_target(regression_target),
        DerivativesTestProblem::new("cross-entropy-sum", CrossEntropyLoss::new(Reduction::Sum), &[3, 4], 9)
            .with_target(classes.clone()),
        DerivativesTestProblem::new("cross-entropy-mean", CrossEntropyLoss::new(Reduction::Mean), &[3, 4], 10)
            .with_target(classes),
    ])
}

pub fn catalog() -> Result<Vec<DerivativesTestProblem>, DerivativesError> {
    let mut problems = layer_problems()?;
    problems.extend(loss_problems()?);
    Ok(problems)
}
