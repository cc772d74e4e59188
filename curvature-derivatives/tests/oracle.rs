mod common;

use common::{assert_agree, implementations, probes, problem};
use curvature_derivatives::testing::{layer_problems, loss_problems, DerivativesImplementation};
use curvature_derivatives::DerivativesError;

const BATCH_PRESERVING: [&str; 6] = ["linear", "linear-no-bias", "relu", "selu", "view", "flatten"];
const SUBSAMPLING: [usize; 2] = [2, 0];

#[test]
fn jac_t_mat_prod_matches_autograd() {
    for problem in layer_problems().unwrap() {
        let (autograd, provider) = implementations(&problem);
        let out_shape = problem.output_shape().unwrap();
        let mat = probes(3, &out_shape, 21);
        let expected = autograd.jac_t_mat_prod(&mat, None).unwrap();
        let actual = provider.jac_t_mat_prod(&mat, None).unwrap();
        assert_agree(&problem, "jac_t_mat_prod", &actual, &expected);
    }
}

#[test]
fn jac_t_mat_prod_with_subsampling_matches_autograd() {
    for id in BATCH_PRESERVING {
        let problem = problem(id);
        let (autograd, provider) = implementations(&problem);
        let mut tail = problem.output_shape().unwrap();
        tail[0] = SUBSAMPLING.len();
        let mat = probes(2, &tail, 22);
        let expected = autograd.jac_t_mat_prod(&mat, Some(&SUBSAMPLING)).unwrap();
        let actual = provider.jac_t_mat_prod(&mat, Some(&SUBSAMPLING)).unwrap();
        assert_eq!(actual.shape()[1], SUBSAMPLING.len());
        assert_agree(&problem, "jac_t_mat_prod (subsampled)", &actual, &expected);
    }
}

#[test]
fn jac_mat_prod_matches_autograd() {
    for problem in layer_problems().unwrap() {
        let (autograd, provider) = implementations(&problem);
        let mat = probes(3, &problem.input_shape, 23);
        let expected = autograd.jac_mat_prod(&mat).unwrap();
        let actual = provider.jac_mat_prod(&mat).unwrap();
        assert_agree(&problem, "jac_mat_prod", &actual, &expected);
    }
}

#[test]
fn parameter_jacobians_match_autograd() {
    let problem = problem("linear");
    let (autograd, provider) = implementations(&problem);
    let out_shape = problem.output_shape().unwrap();
    let (o, i) = (out_shape[1], problem.input_shape[1]);

    for sum_batch in [true, false] {
        for subsampling in [None, Some(&SUBSAMPLING[..])] {
            let n = subsampling.map_or(out_shape[0], <[usize]>::len);
            let mat = probes(2, &[n, o], 24);
            let expected = autograd.weight_jac_t_mat_prod(&mat, sum_batch, subsampling).unwrap();
            let actual = provider.weight_jac_t_mat_prod(&mat, sum_batch, subsampling).unwrap();
            assert_agree(&problem, "weight_jac_t_mat_prod", &actual, &expected);

            let expected = autograd.bias_jac_t_mat_prod(&mat, sum_batch, subsampling).unwrap();
            let actual = provider.bias_jac_t_mat_prod(&mat, sum_batch, subsampling).unwrap();
            assert_agree(&problem, "bias_jac_t_mat_prod", &actual, &expected);
        }
    }

    let mat = probes(3, &[o, i], 25);
    let expected = autograd.weight_jac_mat_prod(&mat).unwrap();
    let actual = provider.weight_jac_mat_prod(&mat).unwrap();
    assert_agree(&problem, "weight_jac_mat_prod", &actual, &expected);

    let mat = probes(3, &[o], 26);
    let expected = autograd.bias_jac_mat_prod(&mat).unwrap();
    let actual = provider.bias_jac_mat_prod(&mat).unwrap();
    assert_agree(&problem, "bias_jac_mat_prod", &actual, &expected);
}

#[test]
fn missing_bias_is_reported_by_both_sides() {
    let problem = problem("linear-no-bias");
    let (autograd, provider) = implementations(&problem);
    let mat = probes(1, &[3, 2], 27);
    assert!(matches!(
        autograd.bias_jac_t_mat_prod(&mat, true, None),
        Err(DerivativesError::MissingParameter { .. })
    ));
    assert!(matches!(
        provider.bias_jac_t_mat_prod(&mat, true, None),
        Err(DerivativesError::MissingParameter { .. })
    ));
}

#[test]
fn ea_jac_t_mat_jac_prod_matches_autograd() {
    for id in BATCH_PRESERVING {
        let problem = problem(id);
        let (autograd, provider) = implementations(&problem);
        let out_shape = problem.output_shape().unwrap();
        let features: usize = out_shape[1..].iter().product();
        let mat = probes(features, &[features], 28);
        let expected = autograd.ea_jac_t_mat_jac_prod(&mat).unwrap();
        let actual = provider.ea_jac_t_mat_jac_prod(&mat).unwrap();
        assert_agree(&problem, "ea_jac_t_mat_jac_prod", &actual, &expected);
    }
}

#[test]
fn sum_hessian_matches_autograd() {
    for problem in loss_problems().unwrap() {
        let (autograd, provider) = implementations(&problem);
        let expected = autograd.sum_hessian().unwrap();
        let actual = provider.sum_hessian().unwrap();
        assert_agree(&problem, "sum_hessian", &actual, &expected);
    }
}

#[test]
fn sqrt_hessian_reproduces_loss_hessian() {
    for problem in loss_problems().unwrap() {
        let (autograd, provider) = implementations(&problem);
        for subsampling in [None, Some(&SUBSAMPLING[..]), Some(&[1][..])] {
            let expected = autograd.input_hessian_via_sqrt_hessian(None, subsampling).unwrap();
            let actual = provider.input_hessian_via_sqrt_hessian(None, subsampling).unwrap();
            assert_agree(&problem, "input Hessian via sqrt_hessian", &actual, &expected);
        }
    }
}

#[test]
fn backward_hessian_matches_autograd() {
    for problem in layer_problems().unwrap() {
        let (autograd, provider) = implementations(&problem);
        let expected = autograd.input_hessian_via_backward_hessian().unwrap();
        let actual = provider.input_hessian_via_backward_hessian().unwrap();
        assert_agree(&problem, "input Hessian via backward_hessian", &actual, &expected);
    }
}

#[test]
fn hessian_is_zero_is_never_claimed_wrongly() {
    for problem in layer_problems().unwrap().into_iter().chain(loss_problems().unwrap()) {
        let (autograd, provider) = implementations(&problem);
        if provider.hessian_is_zero().unwrap() {
            assert!(autograd.hessian_is_zero().unwrap(), "{} claims a zero Hessian", problem.id);
        }
    }
    let selu = problem("selu");
    let (autograd, provider) = implementations(&selu);
    assert!(!provider.hessian_is_zero().unwrap());
    assert!(!autograd.hessian_is_zero().unwrap());
}
