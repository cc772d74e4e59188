use curvature_core::tensor::randn;
use curvature_core::Tensor;
use curvature_derivatives::testing::{
    catalog, compare, AutogradDerivatives, DerivativesTestProblem, ProviderDerivatives, Tolerance,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Helpers shared by the integration test binaries; not every binary uses all of them.
#[allow(dead_code)]
pub fn seeded_randn(shape: &[usize], seed: u64) -> Tensor {
    let mut rng = StdRng::seed_from_u64(seed);
    randn(shape, &mut rng).expect("Test tensor creation failed")
}

/// Random probes `[v, *tail]`.
#[allow(dead_code)]
pub fn probes(v: usize, tail: &[usize], seed: u64) -> Tensor {
    let mut shape = vec![v];
    shape.extend_from_slice(tail);
    seeded_randn(&shape, seed)
}

#[allow(dead_code)]
pub fn problem(id: &str) -> DerivativesTestProblem {
    catalog()
        .expect("Catalog construction failed")
        .into_iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| panic!("no problem named {}", id))
}

#[allow(dead_code)]
pub fn implementations(problem: &DerivativesTestProblem) -> (AutogradDerivatives, ProviderDerivatives) {
    (
        AutogradDerivatives::new(problem.clone()),
        ProviderDerivatives::new(problem.clone()),
    )
}

#[allow(dead_code)]
pub fn assert_agree(problem: &DerivativesTestProblem, what: &str, actual: &Tensor, expected: &Tensor) {
    if let Err(e) = compare(what, actual, expected, Tolerance::default()) {
        panic!("{}: {}", problem.id, e);
    }
}

#[allow(dead_code)]
pub fn dot(a: &Tensor, b: &Tensor) -> f64 {
    a.to_vec().iter().zip(b.to_vec()).map(|(x, y)| x * y).sum()
}
