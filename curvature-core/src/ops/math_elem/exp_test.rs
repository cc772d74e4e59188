use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckError};
use crate::ops::math_elem::sqrt_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_exp_forward() {
    let t = create_test_tensor(vec![0.0, 1.0, -1.0], vec![3]);
    let expected = [1.0, std::f64::consts::E, 1.0 / std::f64::consts::E];
    check_tensor_near(&exp_op(&t).unwrap(), &[3], &expected, 1e-12);
}

#[test]
fn test_exp_backward() -> Result<(), GradCheckError> {
    let t = create_test_tensor_with_grad(vec![0.3, -1.2, 2.0], vec![3]);
    let output_grad = create_test_tensor(vec![1.0, 2.0, -0.5], vec![3]);
    check_grad(|inputs| exp_op(&inputs[0]), &[t], &output_grad, 1e-6, 1e-7, 1e-6)
}

#[test]
fn test_sqrt_backward() -> Result<(), GradCheckError> {
    let t = create_test_tensor_with_grad(vec![0.5, 4.0, 9.0], vec![3]);
    let output_grad = create_test_tensor(vec![1.0, 1.0, 1.0], vec![3]);
    check_grad(|inputs| sqrt_op(&inputs[0]), &[t], &output_grad, 1e-6, 1e-7, 1e-6)
}
