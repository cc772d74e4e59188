use curvature_core::autograd::NoGradGuard;
use curvature_core::Tensor;

use crate::error::DerivativesError;
use crate::module::SupportedModule;

/// Tensors of one forward pass that derivative formulas read.
///
/// All tensors are detached: a record never extends a computation graph.
/// Every provider operation receives the record explicitly.
#[derive(Debug, Clone)]
pub struct ForwardRecord {
    input: Tensor,
    output: Tensor,
    target: Option<Tensor>,
}

impl ForwardRecord {
    pub fn new(input: &Tensor, output: &Tensor, target: Option<&Tensor>) -> Self {
        ForwardRecord {
            input: input.detach(),
            output: output.detach(),
            target: target.map(Tensor::detach),
        }
    }

    /// Runs `module` on `input` without recording a graph and keeps the result.
    pub fn capture(
        module: &SupportedModule,
        input: &Tensor,
        target: Option<&Tensor>,
    ) -> Result<Self, DerivativesError> {
        let _no_grad = NoGradGuard::new();
        let input = input.detach();
        let output = module.forward(&input, target)?;
        Ok(Self::new(&input, &output, target))
    }

    pub fn input(&self) -> &Tensor {
        &self.input
    }

    pub fn output(&self) -> &Tensor {
        &self.output
    }

    pub fn target(&self) -> Option<&Tensor> {
        self.target.as_ref()
    }

    /// Length of the leading (batch) axis of the input.
    pub fn batch_size(&self) -> Result<usize, DerivativesError> {
        self.input
            .shape()
            .first()
            .copied()
            .ok_or(DerivativesError::UnsupportedInputRank {
                expected: 1,
                actual: 0,
                operation: "batch_size".to_string(),
            })
    }
}
