use nalgebra as na;

use crate::{algebra::pseudo_inverse, CalibrationError, Result};

/// M1 edge sensors to M1 rigid body motions
///
/// `k1` is the gain from hardpoint forces to rigid body motions, `k2` the
/// gain from hardpoint forces to edge sensor displacements and `a1` the
/// edge sensor conversion matrix. `n_dof` is the number of observed rigid
/// body motions, i.e. all the segments but the center one (6 segments with
/// 6 degrees of freedom each for the GMT).
///
/// The transform is the minimum-norm least squares solution mapping the
/// first `n_dof` converted edge sensor channels onto the first
/// `n_dof x n_dof` block of `k1`, padded with zero rows for the unobserved
/// rigid body motions and restored to the sensor basis with `a1`.
pub fn edge_sensors_to_rbm(
    k1: &na::DMatrix<f64>,
    k2: &na::DMatrix<f64>,
    a1: &na::DMatrix<f64>,
    n_dof: usize,
) -> Result<na::DMatrix<f64>> {
    if !a1.is_square() || a1.ncols() != k2.nrows() {
        return Err(CalibrationError::MatrixSizeMismatch(
            (k2.nrows(), k2.nrows()),
            a1.shape(),
        ));
    }
    let k2p = a1 * k2;
    // X solves k2p[:,:n_dof]^T X = k1[:n_dof,:n_dof]^T
    let a = k2p.view_range(.., ..n_dof).transpose();
    let b = k1.view_range(..n_dof, ..n_dof).transpose();
    let x = pseudo_inverse(&a)
        .map_err(|e| CalibrationError::PseudoInverse("edge sensors".into(), e))?
        * b;
    // zero rows for the unobserved rigid body motions
    let padded = x.transpose().resize_vertically(k1.nrows(), 0.);
    Ok(padded * a1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_conversion() {
        // with a1 = I and k2 square invertible, the transform restricted to
        // the observed block is k1[:n,:n] * inv(k2[:,:n])[:n,:]
        let n_dof = 4;
        let n = 6;
        let k1 = na::DMatrix::from_fn(n, n, |i, j| if i == j { (i + 1) as f64 } else { 0. });
        let k2 = na::DMatrix::<f64>::identity(n, n);
        let a1 = na::DMatrix::<f64>::identity(n, n);
        let m = edge_sensors_to_rbm(&k1, &k2, &a1, n_dof).unwrap();
        assert_eq!(m.shape(), (n, n));
        for i in 0..n_dof {
            assert!((m[(i, i)] - (i + 1) as f64).abs() < 1e-12);
        }
        // unobserved rows are zero
        for i in n_dof..n {
            assert!(m.row(i).norm() == 0.);
        }
    }

    #[test]
    fn permuted_conversion() {
        // cyclic permutation conversion matrix with k2 = I: the solve runs
        // on the permuted columns and the result is restored to the sensor
        // basis, so the observed gains land back on the diagonal
        let n = 4;
        let n_dof = 2;
        let a1 = na::DMatrix::from_fn(n, n, |i, j| if j == (i + 1) % n { 1. } else { 0. });
        let k2 = na::DMatrix::<f64>::identity(n, n);
        let mut k1 = na::DMatrix::<f64>::zeros(n, n);
        k1[(0, 0)] = 3.;
        k1[(1, 1)] = 5.;
        let m = edge_sensors_to_rbm(&k1, &k2, &a1, n_dof).unwrap();
        let mut expected = na::DMatrix::<f64>::zeros(n, n);
        expected[(0, 0)] = 3.;
        expected[(1, 1)] = 5.;
        assert!((&m - &expected).norm() < 1e-12, "{m}");
    }

    #[test]
    fn conversion_size_mismatch() {
        let k1 = na::DMatrix::<f64>::zeros(6, 6);
        let k2 = na::DMatrix::<f64>::zeros(6, 6);
        let a1 = na::DMatrix::<f64>::zeros(5, 6);
        assert!(edge_sensors_to_rbm(&k1, &k2, &a1, 4).is_err());
    }
}
