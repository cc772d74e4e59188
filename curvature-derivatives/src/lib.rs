//! Second-order derivative providers.
//!
//! For each layer kind of [`curvature_core::nn`] a provider supplies Jacobian
//! and Hessian actions as contractions on probe matrices, so the cost stays
//! proportional to the batch and feature sizes rather than to explicit
//! matrices. The [`testing`] module checks every provider against brute-force
//! autograd.

pub mod derivatives;
pub mod error;
pub mod forward;
pub mod hessian;
pub mod module;
pub mod subsampling;
pub mod testing;

pub use derivatives::{Derivatives, DerivativesKind};
pub use error::DerivativesError;
pub use forward::ForwardRecord;
pub use module::SupportedModule;
