use super::*;
use curvature_core::nn::ReLU;
use curvature_core::CurvatureError;

fn rows() -> Tensor {
    Tensor::new((0..8).map(f64::from).collect(), vec![4, 2]).unwrap()
}

#[test]
fn test_none_is_identity() {
    let t = rows();
    let s = subsample(&t, 0, None).unwrap();
    assert_eq!(s.to_vec(), t.to_vec());
    assert_eq!(s.shape(), vec![4, 2]);
}

#[test]
fn test_selects_in_given_order() {
    let s = subsample(&rows(), 0, Some(&[3, 0])).unwrap();
    assert_eq!(s.shape(), vec![2, 2]);
    assert_eq!(s.to_vec(), vec![6.0, 7.0, 0.0, 1.0]);
}

#[test]
fn test_out_of_range_index() {
    let result = subsample(&rows(), 0, Some(&[0, 4]));
    assert_eq!(
        result.unwrap_err(),
        DerivativesError::Tensor(CurvatureError::IndexOutOfBounds {
            index: 4,
            size: 4,
            operation: "index_select_op".to_string(),
        })
    );
}

#[test]
fn test_subsample_input_and_size() {
    let record = ForwardRecord::capture(&ReLU::new().into(), &rows(), None).unwrap();
    let s = subsample_input(&record, Some(&[1])).unwrap();
    assert_eq!(s.to_vec(), vec![2.0, 3.0]);
    assert_eq!(subsampled_batch_size(4, None), 4);
    assert_eq!(subsampled_batch_size(4, Some(&[2, 1, 0])), 3);
}
