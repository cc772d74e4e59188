mod common;

use approx::assert_relative_eq;
use common::{assert_all_close, seeded_leaf, seeded_randn};
use curvature_core::autograd::grad_check::check_grad;
use curvature_core::autograd::{exact_hessian, grad};
use curvature_core::nn::{CrossEntropyLoss, Linear, Loss, MSELoss, Module, Reduction, SELU};
use curvature_core::ops::activation::{SELU_ALPHA, SELU_SCALE};
use curvature_core::ops::arithmetic::mul_op;
use curvature_core::ops::reduction::sum_all_op;
use curvature_core::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn mse_sum_hessian_is_twice_identity() {
    let input = seeded_leaf(&[2, 3], 1);
    let target = seeded_randn(&[2, 3], 2);
    let loss = MSELoss::new(Reduction::Sum).calculate(&input, &target).unwrap();
    let h = exact_hessian(&loss, &input).unwrap();
    let values = h.to_vec();
    for i in 0..6 {
        for j in 0..6 {
            let expected = if i == j { 2.0 } else { 0.0 };
            assert_relative_eq!(values[i * 6 + j], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn cross_entropy_hessian_is_softmax_covariance() {
    let logits = seeded_leaf(&[1, 4], 3);
    let target = Tensor::new(vec![2.0], vec![1]).unwrap();
    let loss = CrossEntropyLoss::new(Reduction::Sum).calculate(&logits, &target).unwrap();
    let h = exact_hessian(&loss, &logits).unwrap().to_vec();

    let x = logits.to_vec();
    let z: f64 = x.iter().map(|v| v.exp()).sum();
    let p: Vec<f64> = x.iter().map(|v| v.exp() / z).collect();
    let mut expected = vec![0.0; 16];
    for i in 0..4 {
        for j in 0..4 {
            expected[i * 4 + j] = if i == j { p[i] } else { 0.0 } - p[i] * p[j];
        }
    }
    assert_all_close(&h, &expected, 1e-10);
}

#[test]
fn selu_square_hessian_is_diagonal() {
    // f(x) = Σ selu(x)²: f'' = 2 (selu'² + selu · selu'')
    let x = seeded_leaf(&[5], 4);
    let out = SELU::new().forward(&x).unwrap();
    let loss = sum_all_op(&mul_op(&out, &out).unwrap()).unwrap();
    let h = exact_hessian(&loss, &x).unwrap().to_vec();
    for (i, &v) in x.to_vec().iter().enumerate() {
        let (f, df, d2f) = if v > 0.0 {
            (SELU_SCALE * v, SELU_SCALE, 0.0)
        } else {
            let e = SELU_SCALE * SELU_ALPHA * v.exp();
            (e - SELU_SCALE * SELU_ALPHA, e, e)
        };
        for j in 0..5 {
            let expected = if i == j { 2.0 * (df * df + f * d2f) } else { 0.0 };
            assert_relative_eq!(h[i * 5 + j], expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn linear_selu_chain_gradient_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(5);
    let layer = Linear::new(3, 2, true, &mut rng).unwrap();
    let input = seeded_leaf(&[4, 3], 6);
    let output_grad = seeded_randn(&[4, 2], 7);
    check_grad(
        |inputs| SELU::new().forward(&layer.forward(&inputs[0])?),
        &[input],
        &output_grad,
        1e-6,
        1e-7,
        1e-5,
    )
    .unwrap();
}

#[test]
fn parameter_hessian_of_linear_regression() {
    // L = Σ (x Wᵀ - t)², so d²L/dW² = 2 Σ_n x_n x_nᵀ per output row.
    let x = seeded_randn(&[3, 2], 8);
    let target = seeded_randn(&[3, 1], 9);
    let weight = seeded_randn(&[1, 2], 10);
    let layer = Linear::from_parameters(weight, None).unwrap();
    let loss = MSELoss::new(Reduction::Sum)
        .calculate(&layer.forward(&x).unwrap(), &target)
        .unwrap();
    let h = exact_hessian(&loss, layer.weight()).unwrap().to_vec();

    let xs = x.to_vec();
    let mut expected = vec![0.0; 4];
    for n in 0..3 {
        for i in 0..2 {
            for j in 0..2 {
                expected[i * 2 + j] += 2.0 * xs[n * 2 + i] * xs[n * 2 + j];
            }
        }
    }
    assert_all_close(&h, &expected, 1e-10);

    let g = grad(&loss, &[layer.weight().tensor().clone()], None, false).unwrap();
    assert_eq!(g[0].shape(), vec![1, 2]);
}
