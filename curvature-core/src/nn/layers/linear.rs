use rand::RngCore;

use crate::error::CurvatureError;
use crate::nn::init::kaiming_uniform;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::arithmetic::add_op;
use crate::ops::linalg::matmul_op;
use crate::ops::view::{expand_dim_op, transpose_op};
use crate::tensor::Tensor;

/// Applies a linear transformation to the incoming data: `y = x Wᵀ + b`.
///
/// `weight` has shape `[out_features, in_features]` and `bias` shape
/// `[out_features]`. Inputs are 2-D `[batch, in_features]`.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a new Linear layer with uniformly initialised parameters.
    ///
    /// # Arguments
    /// * `in_features` - Size of each input sample.
    /// * `out_features` - Size of each output sample.
    /// * `has_bias` - If `true`, the layer will learn an additive bias.
    /// * `rng` - Source of the initial parameter values.
    pub fn new(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
        rng: &mut dyn RngCore,
    ) -> Result<Self, CurvatureError> {
        let weight = kaiming_uniform(&[out_features, in_features], in_features, rng)?;
        let bias = if has_bias {
            Some(kaiming_uniform(&[out_features], in_features, rng)?)
        } else {
            None
        };
        Self::from_parameters(weight, bias)
    }

    /// Builds a layer around existing weight and bias values.
    pub fn from_parameters(weight: Tensor, bias: Option<Tensor>) -> Result<Self, CurvatureError> {
        let weight_shape = weight.shape();
        if weight_shape.len() != 2 {
            return Err(CurvatureError::RankMismatch {
                expected: 2,
                actual: weight_shape.len(),
                operation: "Linear weight".to_string(),
            });
        }
        let (out_features, in_features) = (weight_shape[0], weight_shape[1]);
        if let Some(b) = &bias {
            if b.shape() != [out_features] {
                return Err(CurvatureError::shape_mismatch(&[out_features], &b.shape(), "Linear bias"));
            }
        }
        Ok(Linear {
            weight: Parameter::new(weight, "weight"),
            bias: bias.map(|b| Parameter::new(b, "bias")),
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, CurvatureError> {
        let input_shape = input.shape();
        if input_shape.len() != 2 || input_shape[1] != self.in_features {
            return Err(CurvatureError::ShapeMismatch {
                expected: format!("[batch, {}]", self.in_features),
                actual: format!("{:?}", input_shape),
                operation: "Linear forward".to_string(),
            });
        }
        let output = matmul_op(input, &transpose_op(&self.weight)?)?;
        match &self.bias {
            Some(bias) => add_op(&output, &expand_dim_op(bias, 0, input_shape[0])?),
            None => Ok(output),
        }
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        if let Some(b) = &self.bias {
            params.push(b);
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = vec![("weight".to_string(), &self.weight)];
        if let Some(b) = &self.bias {
            params.push(("bias".to_string(), b));
        }
        params
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
