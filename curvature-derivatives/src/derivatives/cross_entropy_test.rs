use super::*;
use approx::assert_relative_eq;
use curvature_core::autograd::exact_hessian;
use curvature_core::nn::{CrossEntropyLoss, Loss};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn record(reduction: Reduction) -> ForwardRecord {
    let logits = Tensor::new(vec![0.5, -1.0, 2.0, 0.0, 0.0, 0.0], vec![2, 3]).unwrap();
    let target = Tensor::new(vec![2.0, 0.0], vec![2]).unwrap();
    ForwardRecord::capture(&CrossEntropyLoss::new(reduction).into(), &logits, Some(&target)).unwrap()
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let logits = Tensor::new(vec![1000.0, 1000.0, -5.0, 0.0, 1.0, 2.0], vec![2, 3]).unwrap();
    let probs = softmax(&logits).unwrap().to_vec();
    assert_relative_eq!(probs[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(probs[1], 0.5, epsilon = 1e-12);
    assert_relative_eq!(probs[3..].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_sqrt_hessian_reproduces_uniform_block() {
    let provider = CrossEntropyLossDerivatives::new(Reduction::Sum);
    let sqrt = provider.sqrt_hessian(&record(Reduction::Sum), Some(&[1])).unwrap();
    assert_eq!(sqrt.shape(), vec![3, 1, 3]);

    // Uniform logits: p = 1/3, so H = I/3 - 1/9.
    let s = sqrt.to_vec();
    for i in 0..3 {
        for j in 0..3 {
            let h: f64 = (0..3).map(|k| s[k * 3 + i] * s[k * 3 + j]).sum();
            let expected = if i == j { 1.0 / 3.0 - 1.0 / 9.0 } else { -1.0 / 9.0 };
            assert_relative_eq!(h, expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_mean_sum_hessian_is_scaled() {
    let sum = CrossEntropyLossDerivatives::new(Reduction::Sum)
        .sum_hessian(&record(Reduction::Sum))
        .unwrap()
        .to_vec();
    let mean = CrossEntropyLossDerivatives::new(Reduction::Mean)
        .sum_hessian(&record(Reduction::Mean))
        .unwrap()
        .to_vec();
    for (s, m) in sum.iter().zip(&mean) {
        assert_relative_eq!(*m, *s / 2.0, epsilon = 1e-12);
    }
    // Each block has zero row sums.
    for row in sum.chunks(3) {
        assert_relative_eq!(row.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_sampled_rows_have_zero_sum() {
    let provider = CrossEntropyLossDerivatives::new(Reduction::Sum);
    let mut rng = StdRng::seed_from_u64(3);
    let sampled = provider
        .sqrt_hessian_sampled(&record(Reduction::Sum), 4, None, &mut rng)
        .unwrap();
    assert_eq!(sampled.shape(), vec![4, 2, 3]);
    for row in sampled.to_vec().chunks(3) {
        assert_relative_eq!(row.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_sqrt_hessian_matches_autograd_for_large_logits() {
    let logits = Tensor::new(vec![800.0, 0.0, 1.0, 0.0], vec![2, 2]).unwrap();
    logits.set_requires_grad(true).unwrap();
    let target = Tensor::new(vec![0.0, 0.0], vec![2]).unwrap();
    let loss = CrossEntropyLoss::new(Reduction::Sum).calculate(&logits, &target).unwrap();
    let exact = exact_hessian(&loss, &logits).unwrap().to_vec();

    let record = ForwardRecord::new(&logits, &loss, Some(&target));
    let sqrt = CrossEntropyLossDerivatives::new(Reduction::Sum)
        .sqrt_hessian(&record, None)
        .unwrap()
        .to_vec();
    // sqrt is [k, n, i] with k = i = 2 classes and n = 2 samples.
    for n in 0..2 {
        for m in 0..2 {
            for i in 0..2 {
                for j in 0..2 {
                    let from_sqrt: f64 = if n == m {
                        (0..2).map(|k| sqrt[k * 4 + n * 2 + i] * sqrt[k * 4 + n * 2 + j]).sum()
                    } else {
                        0.0
                    };
                    let autograd = exact[(n * 2 + i) * 4 + m * 2 + j];
                    assert!(autograd.is_finite());
                    assert_relative_eq!(autograd, from_sqrt, epsilon = 1e-12);
                }
            }
        }
    }
}

#[test]
fn test_sampled_rejects_zero_classes() {
    let logits = Tensor::new(vec![], vec![2, 0]).unwrap();
    let output = Tensor::new(vec![0.0], vec![]).unwrap();
    let record = ForwardRecord::new(&logits, &output, None);
    let mut rng = StdRng::seed_from_u64(0);
    let result = CrossEntropyLossDerivatives::new(Reduction::Sum).sqrt_hessian_sampled(&record, 2, None, &mut rng);
    assert!(matches!(result, Err(DerivativesError::InvalidArgument(_))));
}
