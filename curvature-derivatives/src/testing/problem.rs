use curvature_core::ops::arithmetic::mul_op;
use curvature_core::ops::reduction::sum_all_op;
use curvature_core::tensor::randn;
use curvature_core::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::derivatives::DerivativesKind;
use crate::error::DerivativesError;
use crate::forward::ForwardRecord;
use crate::module::SupportedModule;

/// One module, one input shape, one seed.
///
/// The input is regenerated from `seed` on every call, so both oracle sides
/// see the same values.
#[derive(Debug, Clone)]
pub struct DerivativesTestProblem {
    pub id: String,
    pub module: SupportedModule,
    pub input_shape: Vec<usize>,
    pub target: Option<Tensor>,
    pub seed: u64,
}

impl DerivativesTestProblem {
    pub fn new(id: &str, module: impl Into<SupportedModule>, input_shape: &[usize], seed: u64) -> Self {
        DerivativesTestProblem {
            id: id.to_string(),
            module: module.into(),
            input_shape: input_shape.to_vec(),
            target: None,
            seed,
        }
    }

    pub fn with_target(mut self, target: Tensor) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is_loss(&self) -> bool {
        self.module.is_loss()
    }

    pub fn batch_size(&self) -> usize {
        self.input_shape.first().copied().unwrap_or(0)
    }

    /// A fresh leaf input that requires grad.
    pub fn input(&self) -> Result<Tensor, DerivativesError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let input = randn(&self.input_shape, &mut rng)?;
        input.set_requires_grad(true)?;
        Ok(input)
    }

    /// Runs the module on `input` with graph recording.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor, DerivativesError> {
        self.module.forward(input, self.target.as_ref())
    }

    /// A detached record of the forward pass on the problem input.
    pub fn forward_pass(&self) -> Result<ForwardRecord, DerivativesError> {
        ForwardRecord::capture(&self.module, &self.input()?, self.target.as_ref())
    }

    pub fn output_shape(&self) -> Result<Vec<usize>, DerivativesError> {
        Ok(self.forward_pass()?.output().shape())
    }

    pub fn derivatives(&self) -> DerivativesKind {
        self.module.derivatives()
    }
}

/// `Σ out²`: a scalar with a non-trivial Hessian, used to drive Hessian
/// backpropagation through a single layer.
pub fn example_loss(output: &Tensor) -> Result<Tensor, DerivativesError> {
    Ok(sum_all_op(&mul_op(output, output)?)?)
}
