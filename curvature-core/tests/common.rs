use curvature_core::tensor::randn;
use curvature_core::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

// Helpers shared by the integration test binaries; not every binary uses all of them.
#[allow(dead_code)]
pub fn seeded_randn(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    randn(shape, &mut rng).expect("Test tensor creation failed")
}

#[allow(dead_code)]
pub fn seeded_leaf(shape: &[usize], seed: u64) -> Tensor {
    let t = seeded_randn(shape, seed);
    t.set_requires_grad(true).expect("Failed to set requires_grad");
    t
}

#[allow(dead_code)]
pub fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "index {}: actual={} expected={}",
            i,
            a,
            e
        );
    }
}
