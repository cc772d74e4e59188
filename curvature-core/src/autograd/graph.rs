use std::collections::HashSet;
use std::sync::RwLock;

use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a graph node: the address of the tensor's shared data.
///
/// Only valid while a `Tensor` handle on the node is alive; the traversal keeps
/// every visited node alive for that reason.
pub type NodeId = *const RwLock<TensorData>;

/// Returns the nodes reachable from `root` in post-order (inputs before the
/// operations that consume them). `root` is always last.
///
/// The traversal is iterative so deep graphs do not exhaust the stack.
pub fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut sorted = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    // (node, children_pushed)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, children_pushed)) = stack.pop() {
        if children_pushed {
            sorted.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let inputs = node.grad_fn().map(|f| f.inputs()).unwrap_or_default();
        stack.push((node, true));
        for input in inputs {
            if !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }
    sorted
}
