use std::collections::HashMap;

use log::{debug, trace};

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::grad_mode::GradModeGuard;
use crate::error::CurvatureError;
use crate::ops::arithmetic::add_op;
use crate::tensor::{ones, zeros_like, Tensor};

/// Gradients computed by one run of the engine, keyed by node identity.
///
/// Holds the visited nodes so that every key stays a live node.
pub(crate) struct Gradients {
    nodes: Vec<Tensor>,
    grads: HashMap<NodeId, Tensor>,
}

impl Gradients {
    pub(crate) fn get(&self, tensor: &Tensor) -> Option<&Tensor> {
        self.grads.get(&tensor.node_id())
    }

    /// Leaves that require grad, paired with their gradient.
    pub(crate) fn leaves(&self) -> impl Iterator<Item = (Tensor, Tensor)> + '_ {
        self.nodes.iter().filter_map(move |node| {
            if node.is_leaf() && node.requires_grad() {
                self.get(node).map(|g| (node.clone(), g.clone()))
            } else {
                None
            }
        })
    }
}

/// Resolves the gradient a backward pass starts from.
pub(crate) fn initial_gradient(
    output: &Tensor,
    gradient: Option<Tensor>,
) -> Result<Tensor, CurvatureError> {
    match gradient {
        Some(g) => {
            if g.shape() != output.shape() {
                return Err(CurvatureError::shape_mismatch(
                    &output.shape(),
                    &g.shape(),
                    "backward (initial gradient)",
                ));
            }
            Ok(g)
        }
        None => {
            if output.numel() != 1 {
                return Err(CurvatureError::BackwardNonScalar);
            }
            ones(&output.shape())
        }
    }
}

/// Propagates `grad_init` from `root` through the recorded graph.
///
/// With `create_graph = false` the backward formulas run with grad mode off and
/// the results are plain tensors. With `create_graph = true` they are recorded,
/// so the gradients can be differentiated again.
pub(crate) fn run_backward(
    root: &Tensor,
    grad_init: Tensor,
    create_graph: bool,
) -> Result<Gradients, CurvatureError> {
    let _mode = GradModeGuard::new(create_graph);
    let nodes = topological_sort(root);
    debug!(
        "autograd: traversing {} nodes (create_graph={})",
        nodes.len(),
        create_graph
    );

    let mut grads: HashMap<NodeId, Tensor> = HashMap::new();
    grads.insert(root.node_id(), grad_init);

    for node in nodes.iter().rev() {
        let grad_fn = match node.grad_fn() {
            Some(grad_fn) => grad_fn,
            None => continue,
        };
        let grad_output = match grads.get(&node.node_id()) {
            Some(g) => g.clone(),
            None => continue,
        };
        trace!("autograd: backward through {:?}", grad_fn);

        let input_grads = grad_fn.backward(&grad_output)?;
        let inputs = grad_fn.inputs();
        if input_grads.len() != inputs.len() {
            return Err(CurvatureError::InternalError(format!(
                "backward returned {} gradients for {} inputs",
                input_grads.len(),
                inputs.len()
            )));
        }

        for (input, input_grad) in inputs.iter().zip(input_grads) {
            if !input.requires_grad() {
                continue;
            }
            if input_grad.shape() != input.shape() {
                return Err(CurvatureError::shape_mismatch(
                    &input.shape(),
                    &input_grad.shape(),
                    "backward (input gradient)",
                ));
            }
            let id = input.node_id();
            let accumulated = match grads.remove(&id) {
                Some(existing) => add_op(&existing, &input_grad)?,
                None => input_grad,
            };
            grads.insert(id, accumulated);
        }
    }

    Ok(Gradients { nodes, grads })
}

/// Computes the gradients of `output` with respect to each of `inputs`.
///
/// This is the functional counterpart of [`Tensor::backward`]: nothing is
/// accumulated into `.grad`. `grad_output` is the vector in the
/// vector-Jacobian product and defaults to one for single-element outputs.
/// Inputs that `output` does not depend on receive zeros.
///
/// With `create_graph = true` the returned gradients are recorded in the graph
/// and can be differentiated again.
///
/// # Errors
/// * `BackwardNonScalar` if `grad_output` is `None` and `output` has more than one element.
/// * `ShapeMismatch` if `grad_output` does not have the shape of `output`.
pub fn grad(
    output: &Tensor,
    inputs: &[Tensor],
    grad_output: Option<Tensor>,
    create_graph: bool,
) -> Result<Vec<Tensor>, CurvatureError> {
    let grad_init = initial_gradient(output, grad_output)?;
    let gradients = run_backward(output, grad_init, create_graph)?;
    inputs
        .iter()
        .map(|input| match gradients.get(input) {
            Some(g) => Ok(g.clone()),
            None => zeros_like(input),
        })
        .collect()
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
