use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::view::transpose_op;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::Tensor;

/// Backward pass structure for 2-D matrix multiplication.
///
/// For `C = A · B`: `dA = dC · Bᵀ` and `dB = Aᵀ · dC`.
#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        let grad_a = matmul_op(grad_output, &transpose_op(&self.b)?)?;
        let grad_b = matmul_op(&transpose_op(&self.a)?, grad_output)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Multiplies two 2-D tensors `[m, k] · [k, n] -> [m, n]`.
///
/// # Errors
/// * `RankMismatch` if either operand is not 2-D.
/// * `ShapeMismatch` if the inner dimensions differ.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "matmul_op")?;
    check_cpu(b, "matmul_op")?;
    let a_shape = a.shape();
    let b_shape = b.shape();
    for shape in [&a_shape, &b_shape] {
        if shape.len() != 2 {
            return Err(CurvatureError::RankMismatch {
                expected: 2,
                actual: shape.len(),
                operation: "matmul_op".to_string(),
            });
        }
    }
    let (m, k, n) = (a_shape[0], a_shape[1], b_shape[1]);
    if b_shape[0] != k {
        return Err(CurvatureError::ShapeMismatch {
            expected: format!("[{}, _]", k),
            actual: format!("{:?}", b_shape),
            operation: "matmul_op".to_string(),
        });
    }

    let a_buffer = a.buffer();
    let b_buffer = b.buffer();
    let mut data = vec![0.0; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a_buffer[i * k + p];
            for j in 0..n {
                data[i * n + j] += a_ip * b_buffer[p * n + j];
            }
        }
    }
    let output = Tensor::new(data, vec![m, n])?;

    if requires_graph(&[a, b]) {
        let grad_fn = MatmulBackward {
            a: a.clone(),
            b: b.clone(),
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
