use nalgebra as na;

use crate::{
    algebra::{push_pull_columns, push_pull_pairs},
    CalibrationError, Inversion, Result, SegmentBlocks, StaticGain,
};

/// FSM PZT actuators calibration
///
/// Derives the per-segment transforms between the PZT displacements and the
/// M2 segment rigid body motions from 2 FEM static gains:
///  * `K1`: PZT forces to M2 rigid body motions,
///  * `K2`: PZT forces to PZT displacements.
///
/// The push/pull force pairs of both gains are collapsed into signed
/// channels and the PZT stiffness is reduced to the diagonal of the
/// collapsed `K2`.
#[derive(Debug, Clone)]
pub struct FsmCalibration {
    k1p: na::DMatrix<f64>,
    stiffness: na::DVector<f64>,
    blocks: SegmentBlocks,
}

impl FsmCalibration {
    pub fn new(k1: &StaticGain, k2: &StaticGain, blocks: SegmentBlocks) -> Result<Self> {
        let k1p = push_pull_columns(&k1.matrix()?);
        if k1p.shape() != blocks.rbm_gain_shape() {
            return Err(CalibrationError::MatrixSizeMismatch(
                blocks.rbm_gain_shape(),
                k1p.shape(),
            ));
        }
        let k2p = push_pull_pairs(&k2.matrix()?);
        let n = blocks.n_segment * blocks.n_actuator;
        if k2p.shape() != (n, n) {
            return Err(CalibrationError::MatrixSizeMismatch((n, n), k2p.shape()));
        }
        Ok(Self {
            k1p,
            stiffness: k2p.diagonal(),
            blocks,
        })
    }

    fn stiffness_block(&self, i: usize) -> na::DMatrix<f64> {
        let cols = self.blocks.actuator_cols(i);
        na::DMatrix::from_diagonal(
            &self
                .stiffness
                .rows(cols.start, self.blocks.n_actuator)
                .into_owned(),
        )
    }
    fn compliance_block(&self, i: usize) -> na::DMatrix<f64> {
        let cols = self.blocks.actuator_cols(i);
        na::DMatrix::from_diagonal(
            &self
                .stiffness
                .rows(cols.start, self.blocks.n_actuator)
                .map(|x| x.recip()),
        )
    }

    /// PZT displacements to segment tip, tilt and piston
    ///
    /// Per segment, the rotation rows of the collapsed `K1` scaled by the
    /// PZT compliances.
    pub fn pzt_displacement_to_rbm(&self) -> Result<Vec<na::DMatrix<f64>>> {
        (0..self.blocks.n_segment)
            .map(|i| {
                let rows = self.blocks.rbm_rows(i);
                let cols = self.blocks.actuator_cols(i);
                let block = self
                    .k1p
                    .view_range(rows.start + 3..rows.end, cols)
                    .into_owned();
                Ok(block * self.compliance_block(i))
            })
            .collect()
    }

    /// Segment tip/tilt to PZT displacements, RCO flavor
    ///
    /// Per segment, the PZT stiffnesses applied to the inverted piston and
    /// rotation rows of the collapsed `K1`. The reference derivation used
    /// the pseudo-inverse.
    pub fn rbm_to_pzt_rco(&self, inversion: Inversion) -> Result<Vec<na::DMatrix<f64>>> {
        (0..self.blocks.n_segment)
            .map(|i| {
                let rows = self.blocks.rbm_rows(i);
                let cols = self.blocks.actuator_cols(i);
                let block = self
                    .k1p
                    .view_range(rows.start + 2..rows.start + 5, cols)
                    .into_owned();
                Ok(self.stiffness_block(i) * inversion.apply(&block, &format!("segment #{i}"))?)
            })
            .collect()
    }

    /// Segment tip/tilt to PZT displacements, PTH flavor
    ///
    /// The tip/tilt rows of the collapsed `K1` are first folded onto the
    /// 3 actuator axes with [tip_tilt_to_actuators] and the resulting
    /// 2x2 block is inverted. The reference derivation used the plain
    /// inverse.
    pub fn rbm_to_pzt_pth(&self, inversion: Inversion) -> Result<Vec<na::DMatrix<f64>>> {
        let v = tip_tilt_to_actuators();
        (0..self.blocks.n_segment)
            .map(|i| {
                let rows = self.blocks.rbm_rows(i);
                let cols = self.blocks.actuator_cols(i);
                let block = self
                    .k1p
                    .view_range(rows.start + 3..rows.start + 5, cols)
                    .into_owned();
                let t = block * self.compliance_block(i) * &v;
                Ok(&v * inversion.apply(&t, &format!("segment #{i}"))?)
            })
            .collect()
    }

    /// PZT displacements to the full segment rigid body motions
    ///
    /// The 6 signed PZT displacement channels are collapsed with
    /// `O = I_3 kron [1,-1]` and mapped to all 6 rigid body motions.
    pub fn pzt_to_full_rbm(&self) -> Result<Vec<na::DMatrix<f64>>> {
        let o = push_pull_expansion();
        (0..self.blocks.n_segment)
            .map(|i| {
                let rows = self.blocks.rbm_rows(i);
                let cols = self.blocks.actuator_cols(i);
                let block = self.k1p.view_range(rows, cols).into_owned();
                Ok(block * self.compliance_block(i) * &o)
            })
            .collect()
    }
}

/// The 3 PZT actuator unit vectors at 0 and &pm;120 degrees decomposed
/// on the tip/tilt axes
pub fn tip_tilt_to_actuators() -> na::DMatrix<f64> {
    na::DMatrix::from_row_slice(
        3,
        2,
        &[
            0.,
            -2. / 6f64.sqrt(),
            -1. / 2f64.sqrt(),
            1. / 6f64.sqrt(),
            1. / 2f64.sqrt(),
            1. / 6f64.sqrt(),
        ],
    )
}

/// Push/pull channel expansion: `I_3 kron [1,-1]`
pub fn push_pull_expansion() -> na::DMatrix<f64> {
    na::DMatrix::<f64>::identity(3, 3).kronecker(&na::DMatrix::from_row_slice(1, 2, &[1., -1.]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2 segments, 6 RBMs and 3 actuators each
    fn toy_blocks() -> SegmentBlocks {
        SegmentBlocks {
            n_segment: 2,
            n_rbm: 6,
            n_actuator: 3,
        }
    }

    // K1 with push/pull column pairs expanding k1p[i,j] = i*100 + j,
    // K2 with unit pairs so that the collapsed stiffness diagonal is 1
    fn toy_calibration() -> FsmCalibration {
        let blocks = toy_blocks();
        let (nr, nc) = blocks.rbm_gain_shape();
        let k1 = na::DMatrix::from_fn(nr, 2 * nc, |i, j| {
            let x = (i * 100 + j / 2) as f64;
            if j % 2 == 0 {
                2. * x
            } else {
                x
            }
        });
        let k2 = na::DMatrix::from_fn(2 * nc, 2 * nc, |i, j| {
            if i == j && i % 2 == 0 {
                1.
            } else {
                0.
            }
        });
        FsmCalibration::new(&k1.into(), &k2.into(), blocks).unwrap()
    }

    #[test]
    fn tip_tilt_piston_block_selection() {
        let fsm = toy_calibration();
        let mats = fsm.pzt_displacement_to_rbm().unwrap();
        assert_eq!(mats.len(), 2);
        // k1p[i,j] = i*100 + j; segment 0 picks rows 3..6, columns 0..3
        assert_eq!(mats[0].shape(), (3, 3));
        assert_eq!(mats[0][(0, 0)], 300.);
        assert_eq!(mats[0][(2, 2)], 502.);
        // segment 1 picks rows 9..12, columns 3..6
        assert_eq!(mats[1][(0, 0)], 903.);
        assert_eq!(mats[1][(2, 2)], 1105.);
    }

    #[test]
    fn full_rbm_shape() {
        let fsm = toy_calibration();
        let mats = fsm.pzt_to_full_rbm().unwrap();
        assert_eq!(mats[0].shape(), (6, 6));
        // the odd channel of a pair is the opposite of the even one
        assert_eq!(mats[0][(0, 0)], -mats[0][(0, 1)]);
    }

    #[test]
    fn rco_round_trip() {
        let fsm = toy_calibration();
        let fwd = (0..2)
            .map(|i| {
                let rows = fsm.blocks.rbm_rows(i);
                let cols = fsm.blocks.actuator_cols(i);
                fsm.k1p
                    .view_range(rows.start + 2..rows.start + 5, cols)
                    .into_owned()
            })
            .collect::<Vec<_>>();
        let bwd = fsm.rbm_to_pzt_rco(Inversion::PseudoInverse).unwrap();
        for (f, b) in fwd.iter().zip(&bwd) {
            // stiffness is unity: b is the pseudo-inverse of f
            let p = f * b * f;
            assert!((p - f).norm() < 1e-6 * f.norm());
        }
    }

    #[test]
    fn actuator_unit_vectors() {
        let v = tip_tilt_to_actuators();
        // unit vectors
        for i in 0..3 {
            let n = (v[(i, 0)].powi(2) + v[(i, 1)].powi(2)).sqrt();
            assert!((n - 2. / 6f64.sqrt()).abs() < 1e-15);
        }
        // balanced: the 3 vectors sum to zero
        assert!(v.row_sum().norm() < 1e-15);
    }

    #[test]
    fn size_mismatch() {
        let blocks = toy_blocks();
        let k1 = na::DMatrix::<f64>::zeros(12, 12);
        let k2 = na::DMatrix::<f64>::zeros(11, 11);
        assert!(matches!(
            FsmCalibration::new(&k1.into(), &k2.into(), blocks),
            Err(CalibrationError::MatrixSizeMismatch(..))
        ));
    }
}
