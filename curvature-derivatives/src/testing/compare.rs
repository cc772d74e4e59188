use approx::relative_eq;
use curvature_core::{CurvatureError, Tensor};
use log::debug;

use crate::error::DerivativesError;

/// Agreement thresholds for two computations of the same quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance { rtol: 1e-5, atol: 1e-7 }
    }
}

/// Checks `actual` against `expected` element by element.
///
/// Two values agree if they are within `atol` of each other, or within
/// `rtol` relative to the larger magnitude. The first disagreeing element is
/// reported as [`DerivativesError::Mismatch`].
pub fn compare(what: &str, actual: &Tensor, expected: &Tensor, tolerance: Tolerance) -> Result<(), DerivativesError> {
    let actual_shape = actual.shape();
    let expected_shape = expected.shape();
    if actual_shape != expected_shape {
        return Err(CurvatureError::shape_mismatch(&expected_shape, &actual_shape, what).into());
    }
    let mismatch = actual
        .to_vec()
        .into_iter()
        .zip(expected.to_vec())
        .enumerate()
        .find(|(_, (a, e))| !relative_eq!(*a, *e, epsilon = tolerance.atol, max_relative = tolerance.rtol));
    match mismatch {
        Some((index, (a, e))) => Err(DerivativesError::Mismatch {
            what: what.to_string(),
            index,
            expected: e,
            actual: a,
        }),
        None => {
            debug!("compare: {} agrees on {:?}", what, actual_shape);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_within_tolerance() {
        let a = Tensor::new(vec![1.0, 1e-9, -3.0], vec![3]).unwrap();
        let b = Tensor::new(vec![1.0 + 1e-7, 0.0, -3.0], vec![3]).unwrap();
        assert!(compare("close", &a, &b, Tolerance::default()).is_ok());
    }

    #[test]
    fn test_compare_reports_first_mismatch() {
        let a = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        let b = Tensor::new(vec![1.0, 2.5, 4.0], vec![3]).unwrap();
        assert_eq!(
            compare("values", &a, &b, Tolerance::default()).unwrap_err(),
            DerivativesError::Mismatch {
                what: "values".to_string(),
                index: 1,
                expected: 2.5,
                actual: 2.0,
            }
        );
    }

    #[test]
    fn test_compare_shape() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        let b = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
        assert!(matches!(
            compare("shape", &a, &b, Tolerance::default()),
            Err(DerivativesError::Tensor(CurvatureError::ShapeMismatch { .. }))
        ));
    }
}
