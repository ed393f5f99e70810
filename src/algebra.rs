//! Push/pull channel differencing and matrix inversion strategies

use nalgebra as na;

use crate::{CalibrationError, Result};

/// Collapses the even/odd column pairs: `d[:,k] = m[:,2k] - m[:,2k+1]`
pub fn push_pull_columns(m: &na::DMatrix<f64>) -> na::DMatrix<f64> {
    na::DMatrix::from_fn(m.nrows(), m.ncols() / 2, |i, j| {
        m[(i, 2 * j)] - m[(i, 2 * j + 1)]
    })
}

/// Collapses the even/odd row pairs: `d[k,:] = m[2k,:] - m[2k+1,:]`
pub fn push_pull_rows(m: &na::DMatrix<f64>) -> na::DMatrix<f64> {
    na::DMatrix::from_fn(m.nrows() / 2, m.ncols(), |i, j| {
        m[(2 * i, j)] - m[(2 * i + 1, j)]
    })
}

/// Collapses the even/odd row and column pairs: `d[k,l] = m[2k,2l] - m[2k+1,2l+1]`
pub fn push_pull_pairs(m: &na::DMatrix<f64>) -> na::DMatrix<f64> {
    na::DMatrix::from_fn(m.nrows() / 2, m.ncols() / 2, |i, j| {
        m[(2 * i, 2 * j)] - m[(2 * i + 1, 2 * j + 1)]
    })
}

/// Matrix inversion strategy
///
/// The strategy applies to the per-segment conversion blocks:
/// [Inversion::Direct] fails on a singular block whereas
/// [Inversion::PseudoInverse] returns the SVD pseudo-inverse,
/// i.e. the minimum-norm least squares inverse on rank-deficient blocks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Inversion {
    /// Plain inverse, fails on singular blocks
    Direct,
    /// SVD pseudo-inverse
    #[default]
    PseudoInverse,
}

impl Inversion {
    /// Inverts `mat` according to the strategy
    ///
    /// `label` names the block in error reports, e.g. `"segment #3"`.
    pub fn apply(&self, mat: &na::DMatrix<f64>, label: &str) -> Result<na::DMatrix<f64>> {
        match self {
            Inversion::Direct => {
                if !mat.is_square() {
                    return Err(CalibrationError::MatrixSizeMismatch(
                        (mat.nrows(), mat.nrows()),
                        mat.shape(),
                    ));
                }
                mat.clone()
                    .try_inverse()
                    .ok_or_else(|| CalibrationError::Singular(label.to_string()))
            }
            Inversion::PseudoInverse => pseudo_inverse(mat)
                .map_err(|e| CalibrationError::PseudoInverse(label.to_string(), e)),
        }
    }
}

/// SVD pseudo-inverse with a singular value threshold scaled to the matrix norm
pub fn pseudo_inverse(
    mat: &na::DMatrix<f64>,
) -> std::result::Result<na::DMatrix<f64>, String> {
    let svd = mat.clone().svd(true, true);
    let tol = f64::EPSILON * mat.nrows().max(mat.ncols()) as f64 * svd.singular_values.max();
    svd.pseudo_inverse(tol).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_pairs() {
        // columns: [a0,b0,a1,b1]
        let m = na::DMatrix::from_row_slice(2, 4, &[1., 2., 3., 4., 5., 6., 7., 8.]);
        let d = push_pull_columns(&m);
        assert_eq!(d, na::DMatrix::from_row_slice(2, 2, &[-1., -1., -1., -1.]));
    }

    #[test]
    fn row_pairs() {
        let m = na::DMatrix::from_row_slice(4, 2, &[1., 2., 3., 4., 5., 6., 7., 8.]);
        let d = push_pull_rows(&m);
        assert_eq!(d, na::DMatrix::from_row_slice(2, 2, &[-2., -2., -2., -2.]));
    }

    #[test]
    fn row_and_column_pairs() {
        let m = na::DMatrix::from_fn(4, 4, |i, j| (i * 4 + j) as f64);
        let d = push_pull_pairs(&m);
        // d[k,l] = m[2k,2l] - m[2k+1,2l+1]
        assert_eq!(d[(0, 0)], m[(0, 0)] - m[(1, 1)]);
        assert_eq!(d[(1, 0)], m[(2, 0)] - m[(3, 1)]);
        assert_eq!(d[(0, 1)], m[(0, 2)] - m[(1, 3)]);
        assert_eq!(d.shape(), (2, 2));
    }

    #[test]
    fn direct_inversion() {
        let m = na::DMatrix::from_row_slice(2, 2, &[2., 0., 0., 4.]);
        let inv = Inversion::Direct.apply(&m, "test").unwrap();
        assert_eq!(inv, na::DMatrix::from_row_slice(2, 2, &[0.5, 0., 0., 0.25]));
    }

    #[test]
    fn direct_inversion_singular() {
        let m = na::DMatrix::from_row_slice(2, 2, &[1., 2., 2., 4.]);
        assert!(matches!(
            Inversion::Direct.apply(&m, "test"),
            Err(CalibrationError::Singular(_))
        ));
    }

    #[test]
    fn pseudo_inverse_matches_inverse() {
        let m = na::DMatrix::from_row_slice(3, 3, &[4., 1., 0., 1., 3., 1., 0., 1., 2.]);
        let inv = Inversion::Direct.apply(&m, "test").unwrap();
        let pinv = Inversion::PseudoInverse.apply(&m, "test").unwrap();
        assert!((inv - pinv).norm() < 1e-12);
    }

    #[test]
    fn pseudo_inverse_minimum_norm() {
        // wide system: x = A^+ b is the minimum-norm solution of Ax = b
        let a = na::DMatrix::from_row_slice(1, 2, &[1., 1.]);
        let pinv = Inversion::PseudoInverse.apply(&a, "test").unwrap();
        let x = pinv * na::DMatrix::from_row_slice(1, 1, &[2.]);
        assert!((x[(0, 0)] - 1.).abs() < 1e-12);
        assert!((x[(1, 0)] - 1.).abs() < 1e-12);
    }
}
