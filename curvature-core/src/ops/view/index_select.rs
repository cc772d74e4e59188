use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::CurvatureError;
use crate::ops::{attach_grad_fn, check_cpu, requires_graph};
use crate::tensor::utils::split_at_dim;
use crate::tensor::Tensor;

#[derive(Debug)]
struct IndexSelectBackward {
    a: Tensor,
    dim: usize,
    indices: Vec<usize>,
    dim_size: usize,
}

impl BackwardOp for IndexSelectBackward {
    /// Scatters the gradient back to the selected positions, summing repeats.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![index_add_op(
            grad_output,
            self.dim,
            &self.indices,
            self.dim_size,
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

#[derive(Debug)]
struct IndexAddBackward {
    source: Tensor,
    dim: usize,
    indices: Vec<usize>,
}

impl BackwardOp for IndexAddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, CurvatureError> {
        Ok(vec![index_select_op(grad_output, self.dim, &self.indices)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.source.clone()]
    }
}

fn check_dim(shape: &[usize], dim: usize, operation: &str) -> Result<(), CurvatureError> {
    if dim >= shape.len() {
        return Err(CurvatureError::IndexOutOfBounds {
            index: dim,
            size: shape.len(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn check_indices(indices: &[usize], size: usize, operation: &str) -> Result<(), CurvatureError> {
    match indices.iter().find(|&&i| i >= size) {
        Some(&index) => Err(CurvatureError::IndexOutOfBounds {
            index,
            size,
            operation: operation.to_string(),
        }),
        None => Ok(()),
    }
}

/// Selects the slices `indices` along axis `dim`, in the given order.
///
/// Repeated indices are allowed. Out-of-range indices are an error, never
/// clamped.
pub fn index_select_op(a: &Tensor, dim: usize, indices: &[usize]) -> Result<Tensor, CurvatureError> {
    check_cpu(a, "index_select_op")?;
    let shape = a.shape();
    check_dim(&shape, dim, "index_select_op")?;
    let (outer, size, inner) = split_at_dim(&shape, dim);
    check_indices(indices, size, "index_select_op")?;

    let buffer = a.buffer();
    let mut data = Vec::with_capacity(outer * indices.len() * inner);
    for o in 0..outer {
        for &index in indices {
            let start = (o * size + index) * inner;
            data.extend_from_slice(&buffer[start..start + inner]);
        }
    }
    let mut output_shape = shape;
    output_shape[dim] = indices.len();
    let output = Tensor::new(data, output_shape)?;

    if requires_graph(&[a]) {
        let grad_fn = IndexSelectBackward {
            a: a.clone(),
            dim,
            indices: indices.to_vec(),
            dim_size: size,
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

/// Adjoint of [`index_select_op`]: returns a zero tensor whose axis `dim` has
/// length `dim_size`, with slice `j` of `source` added at position `indices[j]`.
///
/// # Errors
/// * `ShapeMismatch` if `source` does not have `indices.len()` slices along `dim`.
/// * `IndexOutOfBounds` if an index is `>= dim_size`.
pub fn index_add_op(
    source: &Tensor,
    dim: usize,
    indices: &[usize],
    dim_size: usize,
) -> Result<Tensor, CurvatureError> {
    check_cpu(source, "index_add_op")?;
    let shape = source.shape();
    check_dim(&shape, dim, "index_add_op")?;
    let (outer, count, inner) = split_at_dim(&shape, dim);
    if count != indices.len() {
        let mut expected = shape.clone();
        expected[dim] = indices.len();
        return Err(CurvatureError::shape_mismatch(&expected, &shape, "index_add_op"));
    }
    check_indices(indices, dim_size, "index_add_op")?;

    let buffer = source.buffer();
    let mut data = vec![0.0; outer * dim_size * inner];
    for o in 0..outer {
        for (j, &index) in indices.iter().enumerate() {
            let src = (o * count + j) * inner;
            let dst = (o * dim_size + index) * inner;
            for i in 0..inner {
                data[dst + i] += buffer[src + i];
            }
        }
    }
    let mut output_shape = shape;
    output_shape[dim] = dim_size;
    let output = Tensor::new(data, output_shape)?;

    if requires_graph(&[source]) {
        let grad_fn = IndexAddBackward {
            source: source.clone(),
            dim,
            indices: indices.to_vec(),
        };
        Ok(attach_grad_fn(output, Arc::new(grad_fn)))
    } else {
        Ok(output)
    }
}

#[cfg(test)]
#[path = "index_select_test.rs"]
mod tests;
