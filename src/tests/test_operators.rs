use approx::assert_abs_diff_eq;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::operators::*;

#[test]
fn test_norm_and_dot() {
    let a = vec![3.0, 4.0];
    let b = vec![1.0, 2.0];
    assert_abs_diff_eq!(norm(&a), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dot(&a, &b), 11.0, epsilon = 1e-12);
}

#[test]
fn test_squared_distance() {
    let a = vec![1.0, 1.0];
    let b = vec![4.0, 5.0];
    assert_abs_diff_eq!(squared_distance(&a, &b), 25.0, epsilon = 1e-12);
}

#[test]
fn test_pearson_perfect_correlation() {
    let a = vec![1.0, 2.0, 3.0, 4.0];
    let b = vec![2.0, 4.0, 6.0, 8.0];
    assert_abs_diff_eq!(pearson(&a, &b), 1.0, epsilon = 1e-12);

    let neg: Vec<f64> = b.iter().map(|x| -x).collect();
    assert_abs_diff_eq!(pearson(&a, &neg), -1.0, epsilon = 1e-12);
}

#[test]
fn test_pearson_uncorrelated() {
    // Orthogonal after mean-centering
    let a = vec![1.0, -1.0, 1.0, -1.0];
    let b = vec![1.0, 1.0, -1.0, -1.0];
    assert_abs_diff_eq!(pearson(&a, &b), 0.0, epsilon = 1e-12);
}

#[test]
fn test_pearson_constant_input_is_zero() {
    let a = vec![2.0, 2.0, 2.0];
    let b = vec![1.0, 2.0, 3.0];
    assert_eq!(pearson(&a, &b), 0.0);
    assert_eq!(pearson(&a, &a), 0.0);
}

#[test]
fn test_fisher_z_matches_atanh() {
    for r in [0.1, 0.3, 0.5, 0.9] {
        assert_abs_diff_eq!(fisher_z(r), r.atanh(), epsilon = 1e-12);
    }
}

#[test]
fn test_fisher_z_saturates_at_unit_correlation() {
    let capped = fisher_z(1.0);
    assert!(capped.is_finite());
    assert_abs_diff_eq!(capped, MAX_CORRELATION.atanh(), epsilon = 1e-12);
    // Symmetric cap on the negative side
    assert_abs_diff_eq!(fisher_z(-1.0), -capped, epsilon = 1e-12);
}

#[test]
fn test_matrix_row_and_col_extraction() {
    let m = DenseMatrix::from_2d_vec(&vec![
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
    ])
    .unwrap();
    assert_eq!(matrix_row(&m, 1), vec![4.0, 5.0, 6.0]);
    assert_eq!(matrix_col(&m, 2), vec![3.0, 6.0]);
    assert_eq!(matrix_rows(&m).len(), 2);
}
