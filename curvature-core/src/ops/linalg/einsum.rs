use log::trace;

use crate::autograd::is_grad_enabled;
use crate::error::CurvatureError;
use crate::ops::check_cpu;
use crate::tensor::Tensor;

/// Parsed form of an equation such as `"vno,ni->voi"`.
///
/// Letters are axis names. A letter may repeat within one operand (`"ii->i"`
/// reads a diagonal). Letters absent from the output are summed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EinsumSpec {
    pub inputs: Vec<Vec<char>>,
    pub output: Vec<char>,
}

impl EinsumSpec {
    /// Parses an explicit equation. Whitespace is ignored and `->` is mandatory.
    pub fn parse(equation: &str) -> Result<Self, CurvatureError> {
        let compact: String = equation.chars().filter(|c| !c.is_whitespace()).collect();
        let invalid = |reason: &str| CurvatureError::InvalidEquation {
            equation: equation.to_string(),
            reason: reason.to_string(),
        };

        let (lhs, rhs) = compact
            .split_once("->")
            .ok_or_else(|| invalid("missing '->'"))?;
        if rhs.contains("->") {
            return Err(invalid("more than one '->'"));
        }
        let inputs: Vec<Vec<char>> = lhs.split(',').map(|term| term.chars().collect()).collect();
        let output: Vec<char> = rhs.chars().collect();

        if inputs
            .iter()
            .chain(std::iter::once(&output))
            .flatten()
            .any(|c| !c.is_ascii_alphabetic())
        {
            return Err(invalid("axis labels must be ASCII letters"));
        }
        for (i, &c) in output.iter().enumerate() {
            if output[..i].contains(&c) {
                return Err(invalid(&format!("output label '{}' repeated", c)));
            }
            if !inputs.iter().any(|term| term.contains(&c)) {
                return Err(invalid(&format!("output label '{}' not in any operand", c)));
            }
        }
        Ok(EinsumSpec { inputs, output })
    }

    /// Labels that are summed over, in order of first appearance.
    fn contracted(&self) -> Vec<char> {
        let mut labels = Vec::new();
        for &c in self.inputs.iter().flatten() {
            if !self.output.contains(&c) && !labels.contains(&c) {
                labels.push(c);
            }
        }
        labels
    }
}

/// Moves an odometer over the axes `range` one step forward and keeps the
/// per-operand offsets in sync.
fn advance(
    counter: &mut [usize],
    offsets: &mut [usize],
    sizes: &[usize],
    strides: &[Vec<usize>],
    range: std::ops::Range<usize>,
) {
    for axis in range.rev() {
        counter[axis] += 1;
        if counter[axis] < sizes[axis] {
            for (offset, operand_strides) in offsets.iter_mut().zip(strides) {
                *offset += operand_strides[axis];
            }
            return;
        }
        for (offset, operand_strides) in offsets.iter_mut().zip(strides) {
            *offset -= operand_strides[axis] * (sizes[axis] - 1);
        }
        counter[axis] = 0;
    }
}

/// Einstein summation over named axes.
///
/// `einsum_op("vno,ni->voi", &[&mat, &input])` contracts `n` and keeps `v`,
/// `o` and `i`. The output shape follows the order of the output labels.
///
/// The contraction is not recorded for autograd.
///
/// # Errors
/// * `InvalidEquation` for malformed equations, wrong operand counts,
///   or labels bound to inconsistent sizes.
/// * `UnsupportedOperation` if grad mode is on and an operand requires grad.
pub fn einsum_op(equation: &str, operands: &[&Tensor]) -> Result<Tensor, CurvatureError> {
    let spec = EinsumSpec::parse(equation)?;
    let invalid = |reason: String| CurvatureError::InvalidEquation {
        equation: equation.to_string(),
        reason,
    };
    if spec.inputs.len() != operands.len() {
        return Err(invalid(format!(
            "{} operand terms but {} tensors",
            spec.inputs.len(),
            operands.len()
        )));
    }
    if is_grad_enabled() && operands.iter().any(|t| t.requires_grad()) {
        return Err(CurvatureError::UnsupportedOperation(
            "einsum_op is not differentiable; detach its operands".to_string(),
        ));
    }

    let contracted = spec.contracted();
    let labels: Vec<char> = spec.output.iter().chain(contracted.iter()).copied().collect();
    let mut sizes = vec![0usize; labels.len()];
    let mut bound = vec![false; labels.len()];
    let mut strides: Vec<Vec<usize>> = Vec::with_capacity(operands.len());

    for (term, operand) in spec.inputs.iter().zip(operands) {
        check_cpu(operand, "einsum_op")?;
        let shape = operand.shape();
        if term.len() != shape.len() {
            return Err(invalid(format!(
                "term '{}' has {} labels for a tensor of shape {:?}",
                term.iter().collect::<String>(),
                term.len(),
                shape
            )));
        }
        let tensor_strides = crate::tensor::utils::calculate_strides(&shape);
        let mut operand_strides = vec![0usize; labels.len()];
        for ((&c, &size), &stride) in term.iter().zip(&shape).zip(&tensor_strides) {
            let axis = labels
                .iter()
                .position(|&l| l == c)
                .ok_or_else(|| invalid(format!("unknown label '{}'", c)))?;
            if bound[axis] && sizes[axis] != size {
                return Err(invalid(format!(
                    "label '{}' bound to sizes {} and {}",
                    c, sizes[axis], size
                )));
            }
            sizes[axis] = size;
            bound[axis] = true;
            operand_strides[axis] += stride;
        }
        strides.push(operand_strides);
    }

    let n_out = spec.output.len();
    let output_shape: Vec<usize> = sizes[..n_out].to_vec();
    let output_numel: usize = output_shape.iter().product();
    let contracted_numel: usize = sizes[n_out..].iter().product();
    trace!(
        "einsum '{}': output {:?}, {} terms per entry",
        equation,
        output_shape,
        contracted_numel
    );

    let mut data = vec![0.0; output_numel];
    if output_numel > 0 && contracted_numel > 0 {
        let buffers: Vec<_> = operands.iter().map(|t| t.buffer()).collect();
        let mut counter = vec![0usize; labels.len()];
        let mut offsets = vec![0usize; operands.len()];
        for entry in data.iter_mut() {
            let mut acc = 0.0;
            for _ in 0..contracted_numel {
                acc += buffers
                    .iter()
                    .zip(&offsets)
                    .map(|(buffer, &offset)| buffer[offset])
                    .product::<f64>();
                advance(&mut counter, &mut offsets, &sizes, &strides, n_out..labels.len());
            }
            *entry = acc;
            advance(&mut counter, &mut offsets, &sizes, &strides, 0..n_out);
        }
    }
    Tensor::new(data, output_shape)
}

#[cfg(test)]
#[path = "einsum_test.rs"]
mod tests;
