use crate::ops::arithmetic::{add_op, mul_op};
use crate::ops::reduction::sum_all_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_backward_accumulates_into_leaves() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let b = create_test_tensor_with_grad(vec![3.0, 4.0], vec![2]);
    let loss = sum_all_op(&mul_op(&a, &b).unwrap()).unwrap();
    loss.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[3.0, 4.0], 1e-12);
    check_tensor_near(&b.grad().unwrap(), &[2], &[1.0, 2.0], 1e-12);

    loss.backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[6.0, 8.0], 1e-12);

    a.clear_grad();
    assert!(a.grad().is_none());
}

#[test]
fn test_backward_skips_non_leaves() {
    let a = create_test_tensor_with_grad(vec![1.0], vec![1]);
    let b = add_op(&a, &a).unwrap();
    assert!(!b.is_leaf());
    let loss = sum_all_op(&b).unwrap();
    loss.backward(None).unwrap();
    assert!(b.grad().is_none());
    check_tensor_near(&a.grad().unwrap(), &[1], &[2.0], 1e-12);
}

#[test]
fn test_backward_on_constant_is_noop() {
    let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
    assert!(t.backward(None).is_ok());
}

#[test]
fn test_detach_cuts_graph() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let b = mul_op(&a, &a).unwrap();
    let d = b.detach();
    assert!(d.is_leaf());
    assert!(!d.requires_grad());
    assert_eq!(d.to_vec(), vec![1.0, 4.0]);
}

#[test]
fn test_grad_fn_comes_from_recorded_ops() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    assert!(a.grad_fn().is_none());
    let recorded = mul_op(&a, &a).unwrap();
    assert!(recorded.grad_fn().is_some());

    let _no_grad = crate::autograd::NoGradGuard::new();
    let unrecorded = mul_op(&a, &a).unwrap();
    assert!(unrecorded.grad_fn().is_none());
    assert!(unrecorded.is_leaf());
}
