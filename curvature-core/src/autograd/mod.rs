//! Reverse-mode automatic differentiation.
//!
//! Operations record a [`BackwardOp`] on their output whenever grad mode is on
//! and one of their inputs requires grad. Backward formulas are themselves
//! written with recorded operations, so running the engine with
//! `create_graph = true` yields gradients that can be differentiated again.
//! [`exact_hessian`] relies on this.

pub mod backward_op;
pub mod engine;
pub mod grad_check;
pub mod grad_mode;
pub mod graph;
pub mod hessian;

pub use backward_op::BackwardOp;
pub use engine::grad;
pub use grad_mode::{is_grad_enabled, GradModeGuard, NoGradGuard};
pub use hessian::exact_hessian;
