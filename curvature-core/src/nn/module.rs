use crate::error::CurvatureError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for all neural network layers.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    ///
    /// # Returns
    /// The output `Tensor`, or a `CurvatureError` if the input does not fit the layer.
    fn forward(&self, input: &Tensor) -> Result<Tensor, CurvatureError>;

    /// Learnable parameters of the module. Empty for parameter-free layers.
    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    /// Learnable parameters with their names (e.g. `"weight"`, `"bias"`).
    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        Vec::new()
    }
}
