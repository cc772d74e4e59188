use thiserror::Error;

use crate::autograd::engine::grad;
use crate::error::CurvatureError;
use crate::tensor::Tensor;

/// Failure modes of [`check_grad`].
#[derive(Error, Debug, PartialEq, Clone)]
pub enum GradCheckError {
    #[error("Gradient mismatch for input {input_index} at element {element_index}: analytical={analytical}, numerical={numerical}")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical: f64,
        numerical: f64,
    },

    #[error("Output gradient shape {actual:?} does not match output shape {expected:?}")]
    OutputGradShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Tensor error during gradient check: {0}")]
    TensorError(#[from] CurvatureError),
}

/// Compares the analytical gradient of `func` with central finite differences.
///
/// The scalar being differentiated is `Σ func(inputs) ⊙ output_grad`. Only
/// inputs with `requires_grad` are checked. An analytical value passes when
/// `|analytical - numerical| <= abs_tol + rel_tol * |numerical|`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    abs_tol: f64,
    rel_tol: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, CurvatureError>,
{
    let output = func(inputs)?;
    if output.shape() != output_grad.shape() {
        return Err(GradCheckError::OutputGradShape {
            expected: output.shape(),
            actual: output_grad.shape(),
        });
    }
    let weights = output_grad.to_vec();
    let analytical = grad(&output, inputs, Some(output_grad.clone()), false)?;

    for (input_index, input) in inputs.iter().enumerate() {
        if !input.requires_grad() {
            continue;
        }
        let analytical_values = analytical[input_index].to_vec();
        let base = input.to_vec();
        for element_index in 0..base.len() {
            let plus = weighted_output(&func, inputs, input_index, &base, element_index, epsilon, &weights)?;
            let minus = weighted_output(&func, inputs, input_index, &base, element_index, -epsilon, &weights)?;
            let numerical = (plus - minus) / (2.0 * epsilon);
            let value = analytical_values[element_index];
            if (value - numerical).abs() > abs_tol + rel_tol * numerical.abs() {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical: value,
                    numerical,
                });
            }
        }
    }
    Ok(())
}

fn weighted_output<F>(
    func: &F,
    inputs: &[Tensor],
    input_index: usize,
    base: &[f64],
    element_index: usize,
    shift: f64,
    weights: &[f64],
) -> Result<f64, CurvatureError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, CurvatureError>,
{
    let mut shifted = base.to_vec();
    shifted[element_index] += shift;
    let mut perturbed: Vec<Tensor> = inputs.iter().map(|t| t.detach()).collect();
    perturbed[input_index] = Tensor::new(shifted, inputs[input_index].shape())?;
    let output = func(&perturbed)?;
    Ok(output
        .to_vec()
        .iter()
        .zip(weights.iter())
        .map(|(o, w)| o * w)
        .sum())
}
