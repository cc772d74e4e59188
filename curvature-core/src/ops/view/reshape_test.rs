use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::utils::testing::{create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_reshape_preserves_values() {
    let data: Vec<f64> = (0..160).map(|v| v as f64).collect();
    let t = create_test_tensor(data.clone(), vec![1, 8, 4, 5]);
    let r = reshape_op(&t, vec![1, 2, 80]).unwrap();
    assert_eq!(r.shape(), vec![1, 2, 80]);
    assert_eq!(r.to_vec(), data);
}

#[test]
fn test_reshape_numel_mismatch() {
    let t = create_test_tensor(vec![0.0; 20], vec![5, 4]);
    let result = reshape_op(&t, vec![10, 3]);
    assert!(matches!(result, Err(CurvatureError::ShapeMismatch { .. })));
}

#[test]
fn test_reshape_to_scalar() {
    let t = create_test_tensor(vec![4.5], vec![1]);
    let s = reshape_op(&t, vec![]).unwrap();
    assert!(s.shape().is_empty());
    assert_eq!(s.item().unwrap(), 4.5);
}

#[test]
fn test_reshape_backward() -> Result<(), GradCheckError> {
    let t = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let output_grad = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]);
    check_grad(
        |inputs| reshape_op(&inputs[0], vec![3, 2]),
        &[t],
        &output_grad,
        1e-6,
        1e-8,
        1e-6,
    )
}
