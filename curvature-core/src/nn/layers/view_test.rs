use super::*;
use crate::tensor::zeros;
use crate::utils::testing::create_test_tensor;

#[test]
fn test_view_infers_axis() {
    let view = View::new(vec![-1, 5, 2]).unwrap();
    assert_eq!(view.output_shape(&[10, 20, 3]).unwrap(), vec![60, 5, 2]);
    let out = view.forward(&zeros(&[10, 20, 3]).unwrap()).unwrap();
    assert_eq!(out.shape(), vec![60, 5, 2]);
}

#[test]
fn test_view_forward_matches_reshape() {
    let data: Vec<f64> = (0..160).map(|v| (v as f64) * 0.5).collect();
    let input = create_test_tensor(data.clone(), vec![1, 8, 4, 5]);
    let out = View::new(vec![1, 2, 80]).unwrap().forward(&input).unwrap();
    assert_eq!(out.shape(), vec![1, 2, 80]);
    assert_eq!(out.to_vec(), data);
}

#[test]
fn test_view_shape_failure() {
    let view = View::new(vec![10, 3]).unwrap();
    let input = zeros(&[5, 4]).unwrap();
    assert!(matches!(
        view.forward(&input),
        Err(CurvatureError::ShapeMismatch { .. })
    ));
    let inferred = View::new(vec![-1, 3]).unwrap();
    assert!(inferred.forward(&input).is_err());
}

#[test]
fn test_view_rejects_bad_targets() {
    assert!(View::new(vec![-1, -1]).is_err());
    assert!(View::new(vec![2, -3]).is_err());
}

#[test]
fn test_flatten() {
    let flatten = Flatten::new();
    let out = flatten.forward(&zeros(&[1, 8, 4, 5]).unwrap()).unwrap();
    assert_eq!(out.shape(), vec![1, 160]);
    assert!(flatten.output_shape(&[]).is_err());
}
