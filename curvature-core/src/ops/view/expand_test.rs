use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_expand_leading_axis() {
    let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let e = expand_dim_op(&t, 0, 3).unwrap();
    check_tensor_near(&e, &[3, 2], &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0], 0.0);
}

#[test]
fn test_expand_trailing_axis() {
    let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let e = expand_dim_op(&t, 1, 2).unwrap();
    check_tensor_near(&e, &[2, 2], &[1.0, 1.0, 2.0, 2.0], 0.0);
}

#[test]
fn test_expand_invalid_dim() {
    let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
    assert!(matches!(
        expand_dim_op(&t, 2, 3),
        Err(CurvatureError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_expand_backward() -> Result<(), GradCheckError> {
    let t = create_test_tensor_with_grad(vec![1.0, -2.0, 0.5], vec![3]);
    let output_grad = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]);
    check_grad(
        |inputs| expand_dim_op(&inputs[0], 1, 2),
        &[t],
        &output_grad,
        1e-6,
        1e-8,
        1e-6,
    )
}
