use nalgebra as na;

use crate::{
    algebra::{push_pull_columns, push_pull_pairs},
    Inversion, Result, StaticGain,
};

/// M2 positioner displacements to M2 rigid body motions
///
/// `k1` is the gain from positioner forces to positioner displacements and
/// `k2` the gain from positioner forces to rigid body motions; both hold
/// push/pull channel pairs. The transform is global to the mirror, not
/// segment-wise.
pub fn hex_displacement_to_rbm(
    k1: &StaticGain,
    k2: &StaticGain,
    inversion: Inversion,
) -> Result<na::DMatrix<f64>> {
    let k1p = push_pull_pairs(&k1.matrix()?);
    let k2p = push_pull_columns(&k2.matrix()?);
    Ok(k2p * inversion.apply(&k1p, "positioners")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_positioner_gain() {
        // pairs collapsing to k1p = 2I and k2p = I: d2r = I/2
        let n = 4;
        let k1 = na::DMatrix::from_fn(2 * n, 2 * n, |i, j| {
            if i == j {
                if i % 2 == 0 {
                    2.
                } else {
                    0.
                }
            } else {
                0.
            }
        });
        let k2 = na::DMatrix::from_fn(n, 2 * n, |i, j| {
            if j == 2 * i {
                1.
            } else {
                0.
            }
        });
        let d2r = hex_displacement_to_rbm(&k1.into(), &k2.into(), Inversion::Direct).unwrap();
        assert!((d2r - na::DMatrix::<f64>::identity(n, n) * 0.5).norm() < 1e-14);
    }
}
