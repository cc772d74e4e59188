use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_add_tensors_ok() {
    let t1 = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let t2 = create_test_tensor(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
    let result = add_op(&t1, &t2).unwrap();
    check_tensor_near(&result, &[2, 2], &[6.0, 8.0, 10.0, 12.0], 1e-12);
    assert!(!result.requires_grad());
}

#[test]
fn test_add_tensors_shape_mismatch() {
    let t1 = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let t2 = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
    let result = add_op(&t1, &t2);
    assert!(matches!(result, Err(CurvatureError::ShapeMismatch { .. })));
}

#[test]
fn test_add_records_graph_only_when_needed() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let b = create_test_tensor(vec![3.0, 4.0], vec![2]);
    let c = add_op(&a, &b).unwrap();
    assert!(c.requires_grad());
    assert!(c.grad_fn().is_some());

    let _guard = crate::autograd::NoGradGuard::new();
    let d = add_op(&a, &b).unwrap();
    assert!(!d.requires_grad());
}

#[test]
fn test_add_backward() -> Result<(), GradCheckError> {
    let a = create_test_tensor_with_grad(vec![1.0, -2.0, 3.0], vec![3]);
    let b = create_test_tensor_with_grad(vec![0.5, 0.1, -4.0], vec![3]);
    let output_grad = create_test_tensor(vec![1.0, 2.0, -1.0], vec![3]);
    check_grad(
        |inputs| add_op(&inputs[0], &inputs[1]),
        &[a, b],
        &output_grad,
        1e-6,
        1e-8,
        1e-6,
    )
}
