use crate::tensor::Tensor;

/// Checks that `actual` has `expected_shape` and data within `tolerance` of
/// `expected_data`. Panics with the first offending index otherwise.
pub fn check_tensor_near(
    actual: &Tensor,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");
    let actual_data = actual.to_vec();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );
    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// Creates a tensor for tests.
pub fn create_test_tensor(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Failed to create test tensor")
}

/// Creates a leaf tensor that requires grad for tests.
pub fn create_test_tensor_with_grad(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
    let tensor = create_test_tensor(data, shape);
    tensor
        .set_requires_grad(true)
        .expect("Failed to set requires_grad");
    tensor
}
