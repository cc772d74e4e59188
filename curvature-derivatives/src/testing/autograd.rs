use curvature_core::autograd::{exact_hessian, grad, GradModeGuard};
use curvature_core::ops::arithmetic::{mul_op, mul_scalar_op};
use curvature_core::ops::linalg::einsum_op;
use curvature_core::ops::reduction::sum_all_op;
use curvature_core::ops::view::{index_add_op, index_select_op, reshape_op};
use curvature_core::tensor::{randn, zeros};
use curvature_core::{CurvatureError, Tensor};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::implementation::DerivativesImplementation;
use super::problem::{example_loss, DerivativesTestProblem};
use crate::derivatives::with_batch;
use crate::error::DerivativesError;
use crate::hessian::{select_blocks, sum_diagonal_blocks};
use crate::subsampling::{subsample, subsampled_batch_size};

/// Reference implementation built only on the autograd engine.
///
/// Jacobian-transpose products are vector-Jacobian products. Jacobian
/// products differentiate a VJP w.r.t. its upstream vector. Hessians come
/// from [`exact_hessian`].
#[derive(Debug, Clone)]
pub struct AutogradDerivatives {
    problem: DerivativesTestProblem,
}

fn first(grads: Vec<Tensor>) -> Result<Tensor, DerivativesError> {
    grads
        .into_iter()
        .next()
        .ok_or_else(|| CurvatureError::InternalError("grad returned no gradient".to_string()).into())
}

fn vjp(output: &Tensor, wrt: &Tensor, vector: Tensor, create_graph: bool) -> Result<Tensor, DerivativesError> {
    first(grad(output, &[wrt.clone()], Some(vector), create_graph)?)
}

fn leading(mat: &Tensor, operation: &str) -> Result<usize, DerivativesError> {
    mat.shape()
        .first()
        .copied()
        .ok_or_else(|| DerivativesError::UnsupportedInputRank {
            expected: 1,
            actual: 0,
            operation: operation.to_string(),
        })
}

/// Slice `v` of `mat` along its leading axis, with that axis removed.
fn probe(mat: &Tensor, v: usize) -> Result<Tensor, DerivativesError> {
    let tail = mat.shape()[1..].to_vec();
    Ok(reshape_op(&index_select_op(mat, 0, &[v])?, tail)?)
}

fn stack(parts: &[Tensor], mut shape: Vec<usize>, tail: &[usize]) -> Result<Tensor, DerivativesError> {
    let data: Vec<f64> = parts.iter().flat_map(Tensor::to_vec).collect();
    shape.extend_from_slice(tail);
    Ok(Tensor::new(data, shape)?)
}

/// Places rows `[n, ...]` back at their batch positions in a zero tensor.
fn scatter(rows: &Tensor, subsampling: Option<&[usize]>, batch: usize) -> Result<Tensor, DerivativesError> {
    match subsampling {
        None => Ok(rows.clone()),
        Some(indices) => Ok(index_add_op(rows, 0, indices, batch)?),
    }
}

impl AutogradDerivatives {
    pub fn new(problem: DerivativesTestProblem) -> Self {
        AutogradDerivatives { problem }
    }

    /// Input leaf and the recorded output of the module.
    fn tracked(&self) -> Result<(Tensor, Tensor), DerivativesError> {
        let _mode = GradModeGuard::new(true);
        let input = self.problem.input()?;
        let output = self.problem.forward(&input)?;
        Ok((input, output))
    }

    /// The loss itself for loss problems, `Σ out²` for layers.
    fn objective(&self, output: &Tensor) -> Result<Tensor, DerivativesError> {
        if self.problem.is_loss() {
            Ok(output.clone())
        } else {
            example_loss(output)
        }
    }

    /// Hessian of the objective w.r.t. the input, as `[N, F, N, F]`.
    fn batch_hessian(&self) -> Result<Tensor, DerivativesError> {
        let (input, output) = self.tracked()?;
        let _mode = GradModeGuard::new(true);
        let objective = self.objective(&output)?;
        let hessian = exact_hessian(&objective, &input)?;
        let n = self.problem.batch_size();
        let f = input.numel() / n.max(1);
        Ok(reshape_op(&hessian, vec![n, f, n, f])?)
    }

    /// `J mat` for the Jacobian of the output w.r.t. the input, or w.r.t. the
    /// named parameter. Differentiates `Jᵀu` w.r.t. a dummy `u`.
    fn jac_mat_prod_wrt(&self, parameter: Option<&str>, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let (input, output) = self.tracked()?;
        let wrt = match parameter {
            None => input,
            Some(name) => self.problem.module.parameter(name)?,
        };
        let _mode = GradModeGuard::new(true);
        let out_shape = output.shape();
        let dummy = zeros(&out_shape)?;
        dummy.set_requires_grad(true)?;
        let transposed = vjp(&output, &wrt, dummy.clone(), true)?;

        let v_count = leading(mat, "jac_mat_prod")?;
        let mut parts = Vec::with_capacity(v_count);
        for v in 0..v_count {
            parts.push(vjp(&transposed, &dummy, probe(mat, v)?, false)?);
        }
        stack(&parts, vec![v_count], &out_shape)
    }

    fn param_jac_t_mat_prod(
        &self,
        parameter: &str,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let (_, output) = self.tracked()?;
        let wrt = self.problem.module.parameter(parameter)?;
        let param_shape = wrt.shape();
        let batch = leading(&output, "param_jac_t_mat_prod")?;
        let n = subsampled_batch_size(batch, subsampling);
        let v_count = leading(mat, "param_jac_t_mat_prod")?;

        let mut parts = Vec::new();
        for v in 0..v_count {
            let rows = probe(mat, v)?;
            if sum_batch {
                parts.push(vjp(&output, &wrt, scatter(&rows, subsampling, batch)?, false)?);
                continue;
            }
            for j in 0..n {
                let position = subsampling.map_or(j, |indices| indices[j]);
                let row = index_select_op(&rows, 0, &[j])?;
                let single = index_add_op(&row, 0, &[position], batch)?;
                parts.push(vjp(&output, &wrt, single, false)?);
            }
        }
        let leading_shape = if sum_batch { vec![v_count] } else { vec![v_count, n] };
        stack(&parts, leading_shape, &param_shape)
    }
}

impl DerivativesImplementation for AutogradDerivatives {
    fn name(&self) -> &'static str {
        "AutogradDerivatives"
    }

    fn problem(&self) -> &DerivativesTestProblem {
        &self.problem
    }

    fn jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.jac_mat_prod_wrt(None, mat)
    }

    fn jac_t_mat_prod(&self, mat: &Tensor, subsampling: Option<&[usize]>) -> Result<Tensor, DerivativesError> {
        let (input, output) = self.tracked()?;
        let in_shape = input.shape();
        let out_batch = leading(&output, "jac_t_mat_prod")?;
        let n = subsampled_batch_size(leading(&input, "jac_t_mat_prod")?, subsampling);
        let v_count = leading(mat, "jac_t_mat_prod")?;

        let mut parts = Vec::with_capacity(v_count);
        for v in 0..v_count {
            let full = scatter(&probe(mat, v)?, subsampling, out_batch)?;
            let gradient = vjp(&output, &input, full, false)?;
            parts.push(subsample(&gradient, 0, subsampling)?);
        }
        stack(&parts, vec![v_count], &with_batch(&in_shape, n))
    }

    fn weight_jac_t_mat_prod(
        &self,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        self.param_jac_t_mat_prod("weight", mat, sum_batch, subsampling)
    }

    fn bias_jac_t_mat_prod(
        &self,
        mat: &Tensor,
        sum_batch: bool,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        self.param_jac_t_mat_prod("bias", mat, sum_batch, subsampling)
    }

    fn weight_jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.jac_mat_prod_wrt(Some("weight"), mat)
    }

    fn bias_jac_mat_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        self.jac_mat_prod_wrt(Some("bias"), mat)
    }

    /// Builds every per-sample Jacobian row by row, then averages `Jₙᵀ M Jₙ`.
    fn ea_jac_t_mat_jac_prod(&self, mat: &Tensor) -> Result<Tensor, DerivativesError> {
        let (input, output) = self.tracked()?;
        let in_shape = input.shape();
        let out_shape = output.shape();
        if in_shape.first() != out_shape.first() {
            return Err(CurvatureError::UnsupportedOperation(
                "ea_jac_t_mat_jac_prod: module mixes the batch axis".to_string(),
            )
            .into());
        }
        let n = in_shape[0];
        let f_in = input.numel() / n.max(1);
        let f_out = output.numel() / n.max(1);

        let mut jacobians = vec![0.0; n * f_out * f_in];
        for sample in 0..n {
            for o in 0..f_out {
                let mut unit = vec![0.0; output.numel()];
                unit[sample * f_out + o] = 1.0;
                let gradient = vjp(&output, &input, Tensor::new(unit, out_shape.clone())?, false)?.to_vec();
                let start = (sample * f_out + o) * f_in;
                jacobians[start..start + f_in]
                    .copy_from_slice(&gradient[sample * f_in..(sample + 1) * f_in]);
            }
        }
        let jacobians = Tensor::new(jacobians, vec![n, f_out, f_in])?;
        let summed = einsum_op("noi,op,npj->ij", &[&jacobians, mat, &jacobians])?;
        Ok(mul_scalar_op(&summed, 1.0 / n as f64)?)
    }

    fn sum_hessian(&self) -> Result<Tensor, DerivativesError> {
        sum_diagonal_blocks(&self.batch_hessian()?)
    }

    fn input_hessian_via_sqrt_hessian(
        &self,
        _mc_samples: Option<usize>,
        subsampling: Option<&[usize]>,
    ) -> Result<Tensor, DerivativesError> {
        let blocks = select_blocks(&self.batch_hessian()?, subsampling)?;
        let shape = blocks.shape();
        let side = shape[0] * shape[1];
        Ok(reshape_op(&blocks, vec![side, side])?)
    }

    fn input_hessian_via_backward_hessian(&self) -> Result<Tensor, DerivativesError> {
        let (input, output) = self.tracked()?;
        let _mode = GradModeGuard::new(true);
        Ok(exact_hessian(&self.objective(&output)?, &input)?)
    }

    /// Probes `⟨w, out⟩` for a random `w`: its input Hessian vanishes for
    /// every `w` iff the output is affine in the input.
    fn hessian_is_zero(&self) -> Result<bool, DerivativesError> {
        let (input, output) = self.tracked()?;
        let _mode = GradModeGuard::new(true);
        let weights = randn(&output.shape(), &mut StdRng::seed_from_u64(self.problem.seed.wrapping_add(1)))?;
        let probe = sum_all_op(&mul_op(&output, &weights)?)?;
        let hessian = exact_hessian(&probe, &input)?;
        let largest = hessian.to_vec().into_iter().fold(0.0f64, |acc, h| acc.max(h.abs()));
        debug!("{}: largest probe Hessian entry {:e}", self.problem.id, largest);
        Ok(largest <= 1e-12)
    }
}
