use super::*;
use crate::autograd::grad;
use crate::ops::reduction::sum_all_op;
use crate::utils::testing::{check_tensor_near, create_test_tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixed_layer() -> Linear {
    let weight = create_test_tensor(vec![1.0, 0.0, -1.0, 2.0, 1.0, 0.5], vec![2, 3]);
    let bias = create_test_tensor(vec![0.1, -0.2], vec![2]);
    Linear::from_parameters(weight, Some(bias)).unwrap()
}

#[test]
fn test_linear_creation() {
    let mut rng = StdRng::seed_from_u64(0);
    let layer = Linear::new(4, 3, true, &mut rng).unwrap();
    assert_eq!(layer.weight().shape(), vec![3, 4]);
    assert_eq!(layer.bias().unwrap().shape(), vec![3]);
    assert!(layer.weight().requires_grad());
    assert_eq!(layer.parameters().len(), 2);

    let no_bias = Linear::new(4, 3, false, &mut rng).unwrap();
    assert!(no_bias.bias().is_none());
    let names: Vec<String> = no_bias.named_parameters().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["weight".to_string()]);
}

#[test]
fn test_linear_forward() {
    let layer = fixed_layer();
    let input = create_test_tensor(vec![1.0, 2.0, 3.0, 0.0, 1.0, 0.0], vec![2, 3]);
    let output = layer.forward(&input).unwrap();
    // row 0: [1 - 3, 2 + 2 + 1.5] + b ; row 1: [0, 1] + b
    check_tensor_near(&output, &[2, 2], &[-1.9, 5.3, 0.1, 0.8], 1e-12);
}

#[test]
fn test_linear_rejects_wrong_width() {
    let layer = fixed_layer();
    let input = create_test_tensor(vec![1.0, 2.0], vec![1, 2]);
    assert!(matches!(
        layer.forward(&input),
        Err(CurvatureError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_linear_parameter_gradients() {
    let layer = fixed_layer();
    let input = create_test_tensor(vec![1.0, 2.0, 3.0, 0.0, 1.0, 0.0], vec![2, 3]);
    let loss = sum_all_op(&layer.forward(&input).unwrap()).unwrap();
    let params: Vec<Tensor> = layer.parameters().into_iter().map(|p| p.tensor().clone()).collect();
    let grads = grad(&loss, &params, None, false).unwrap();
    // d/dW_oi = sum_n x_ni ; d/db_o = N
    check_tensor_near(&grads[0], &[2, 3], &[1.0, 3.0, 3.0, 1.0, 3.0, 3.0], 1e-12);
    check_tensor_near(&grads[1], &[2], &[2.0, 2.0], 1e-12);
}
