use std::fmt::Debug;

use crate::error::CurvatureError;
use crate::tensor::Tensor;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` has an associated `BackwardOp`
/// stored in the output's `grad_fn`. The engine walks these nodes in reverse
/// topological order to propagate gradients with the chain rule.
///
/// Implementations keep handles on their *inputs* only, never on their output,
/// so the graph holds no reference cycles.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradient of each input given the gradient of the output.
    ///
    /// The returned vector **must** follow the order of [`BackwardOp::inputs`] and
    /// each gradient must have the shape of the corresponding input.
    ///
    /// Implementations must build their results from the crate's `xxx_op`
    /// functions rather than raw buffers, so that the result is recorded when
    /// the engine runs with `create_graph = true`.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError>;

    /// Input tensors that participated in the forward operation.
    fn inputs(&self) -> Vec<Tensor>;
}
