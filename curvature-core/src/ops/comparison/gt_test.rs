use super::*;
use crate::utils::testing::{create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_gt_mask() {
    let t = create_test_tensor(vec![-1.0, 0.0, 0.5, 2.0], vec![2, 2]);
    let mask = gt_op(&t, 0.0).unwrap();
    assert_eq!(mask.shape(), vec![2, 2]);
    assert_eq!(mask.to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_gt_mask_never_requires_grad() {
    let t = create_test_tensor_with_grad(vec![1.0, -1.0], vec![2]);
    let mask = gt_op(&t, 0.0).unwrap();
    assert!(!mask.requires_grad());
    assert!(mask.grad_fn().is_none());
}
