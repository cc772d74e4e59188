//! Differential test oracle.
//!
//! A [`DerivativesTestProblem`] describes one module on one seeded input.
//! [`AutogradDerivatives`] computes every quantity from the autograd engine
//! alone; [`ProviderDerivatives`] computes it with the closed-form provider.
//! [`compare`] decides whether the two agree.

pub mod autograd;
pub mod compare;
pub mod implementation;
pub mod problem;
pub mod problems;
pub mod provider;

pub use autograd::AutogradDerivatives;
pub use compare::{compare, Tolerance};
pub use implementation::DerivativesImplementation;
pub use problem::{example_loss, DerivativesTestProblem};
pub use problems::{catalog, layer_problems, loss_problems};
pub use provider::ProviderDerivatives;
