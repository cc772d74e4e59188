use curvature_core::nn::{
    CrossEntropyLoss, Flatten, Linear, Loss, MSELoss, Module, ReLU, View, SELU,
};
use curvature_core::Tensor;

use crate::derivatives::{
    CrossEntropyLossDerivatives, DerivativesKind, LinearDerivatives, MSELossDerivatives,
    ReLUDerivatives, SELUDerivatives, ViewDerivatives,
};
use crate::error::DerivativesError;

/// The closed catalog of layers with a derivative provider.
#[derive(Debug, Clone)]
pub enum SupportedModule {
    Linear(Linear),
    ReLU(ReLU),
    SELU(SELU),
    View(View),
    Flatten(Flatten),
    MSELoss(MSELoss),
    CrossEntropyLoss(CrossEntropyLoss),
}

impl SupportedModule {
    pub fn name(&self) -> &'static str {
        match self {
            SupportedModule::Linear(_) => "Linear",
            SupportedModule::ReLU(_) => "ReLU",
            SupportedModule::SELU(_) => "SELU",
            SupportedModule::View(_) => "View",
            SupportedModule::Flatten(_) => "Flatten",
            SupportedModule::MSELoss(_) => "MSELoss",
            SupportedModule::CrossEntropyLoss(_) => "CrossEntropyLoss",
        }
    }

    pub fn is_loss(&self) -> bool {
        matches!(
            self,
            SupportedModule::MSELoss(_) | SupportedModule::CrossEntropyLoss(_)
        )
    }

    /// Runs the module. Losses require `target`; layers ignore it.
    pub fn forward(&self, input: &Tensor, target: Option<&Tensor>) -> Result<Tensor, DerivativesError> {
        let output = match self {
            SupportedModule::Linear(m) => m.forward(input)?,
            SupportedModule::ReLU(m) => m.forward(input)?,
            SupportedModule::SELU(m) => m.forward(input)?,
            SupportedModule::View(m) => m.forward(input)?,
            SupportedModule::Flatten(m) => m.forward(input)?,
            SupportedModule::MSELoss(m) => m.calculate(input, self.require_target(target)?)?,
            SupportedModule::CrossEntropyLoss(m) => {
                m.calculate(input, self.require_target(target)?)?
            }
        };
        Ok(output)
    }

    fn require_target<'a>(&self, target: Option<&'a Tensor>) -> Result<&'a Tensor, DerivativesError> {
        target.ok_or_else(|| DerivativesError::MissingTarget {
            module: self.name().to_string(),
        })
    }

    /// Chooses the derivative provider for this module.
    pub fn derivatives(&self) -> DerivativesKind {
        match self {
            SupportedModule::Linear(m) => DerivativesKind::Linear(LinearDerivatives::from_layer(m)),
            SupportedModule::ReLU(_) => DerivativesKind::ReLU(ReLUDerivatives::default()),
            SupportedModule::SELU(_) => DerivativesKind::SELU(SELUDerivatives::default()),
            SupportedModule::View(_) | SupportedModule::Flatten(_) => {
                DerivativesKind::View(ViewDerivatives)
            }
            SupportedModule::MSELoss(m) => {
                DerivativesKind::MSELoss(MSELossDerivatives::new(m.reduction()))
            }
            SupportedModule::CrossEntropyLoss(m) => {
                DerivativesKind::CrossEntropyLoss(CrossEntropyLossDerivatives::new(m.reduction()))
            }
        }
    }

    /// Looks up a learnable parameter (`"weight"` or `"bias"`) by name.
    pub fn parameter(&self, name: &str) -> Result<Tensor, DerivativesError> {
        let found = match (self, name) {
            (SupportedModule::Linear(m), "weight") => Some(m.weight().tensor().clone()),
            (SupportedModule::Linear(m), "bias") => m.bias().map(|b| b.tensor().clone()),
            _ => None,
        };
        found.ok_or_else(|| DerivativesError::MissingParameter {
            parameter: name.to_string(),
            provider: self.name().to_string(),
        })
    }
}

impl From<Linear> for SupportedModule {
    fn from(m: Linear) -> Self {
        SupportedModule::Linear(m)
    }
}

impl From<ReLU> for SupportedModule {
    fn from(m: ReLU) -> Self {
        SupportedModule::ReLU(m)
    }
}

impl From<SELU> for SupportedModule {
    fn from(m: SELU) -> Self {
        SupportedModule::SELU(m)
    }
}

impl From<View> for SupportedModule {
    fn from(m: View) -> Self {
        SupportedModule::View(m)
    }
}

impl From<Flatten> for SupportedModule {
    fn from(m: Flatten) -> Self {
        SupportedModule::Flatten(m)
    }
}

impl From<MSELoss> for SupportedModule {
    fn from(m: MSELoss) -> Self {
        SupportedModule::MSELoss(m)
    }
}

impl From<CrossEntropyLoss> for SupportedModule {
    fn from(m: CrossEntropyLoss) -> Self {
        SupportedModule::CrossEntropyLoss(m)
    }
}
