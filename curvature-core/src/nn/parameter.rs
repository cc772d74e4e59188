use std::fmt;
use std::ops::Deref;

use crate::tensor::Tensor;

/// A wrapper around a Tensor indicating it is a learnable parameter of a Module.
/// Parameters always have `requires_grad` set to `true`.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Creates a named parameter and marks its tensor as requiring grad.
    pub fn new(tensor: Tensor, name: &str) -> Self {
        let mut param = Self::new_unnamed(tensor);
        param.name = Some(name.to_string());
        param
    }

    pub fn new_unnamed(tensor: Tensor) -> Self {
        let _ = tensor.set_requires_grad(true);
        Parameter { tensor, name: None }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the underlying Tensor handle.
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.tensor
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?}, {:?})", self.name, self.tensor)
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
