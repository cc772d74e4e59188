use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_matmul_2x3_3x2() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let b = create_test_tensor(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]);
    let c = matmul_op(&a, &b).unwrap();
    check_tensor_near(&c, &[2, 2], &[58.0, 64.0, 139.0, 154.0], 1e-12);
}

#[test]
fn test_matmul_inner_dim_mismatch() {
    let a = create_test_tensor(vec![0.0; 6], vec![2, 3]);
    let b = create_test_tensor(vec![0.0; 4], vec![2, 2]);
    assert!(matches!(
        matmul_op(&a, &b),
        Err(CurvatureError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_matmul_rank_mismatch() {
    let a = create_test_tensor(vec![0.0; 3], vec![3]);
    let b = create_test_tensor(vec![0.0; 3], vec![3, 1]);
    assert!(matches!(
        matmul_op(&a, &b),
        Err(CurvatureError::RankMismatch { .. })
    ));
}

#[test]
fn test_matmul_backward() -> Result<(), GradCheckError> {
    let a = create_test_tensor_with_grad(vec![1.0, -2.0, 0.5, 3.0, 1.5, -1.0], vec![2, 3]);
    let b = create_test_tensor_with_grad(vec![0.2, 1.0, -0.7, 2.0, 1.1, -0.3], vec![3, 2]);
    let output_grad = create_test_tensor(vec![1.0, -1.0, 0.5, 2.0], vec![2, 2]);
    check_grad(
        |inputs| matmul_op(&inputs[0], &inputs[1]),
        &[a, b],
        &output_grad,
        1e-6,
        1e-7,
        1e-6,
    )
}
