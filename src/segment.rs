use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Per-segment block layout of the assembled gain matrices
///
/// The assembled matrices stack the segments in order: segment `i` owns
/// `n_rbm` consecutive rigid body motion rows starting at `i*n_rbm` and
/// `n_actuator` consecutive actuator columns starting at `i*n_actuator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBlocks {
    pub n_segment: usize,
    pub n_rbm: usize,
    pub n_actuator: usize,
}

impl Default for SegmentBlocks {
    /// GMT defaults: 7 segments, 6 rigid body motions, 3 actuators
    fn default() -> Self {
        Self {
            n_segment: 7,
            n_rbm: 6,
            n_actuator: 3,
        }
    }
}

impl SegmentBlocks {
    /// Rigid body motion rows of segment `i`
    pub fn rbm_rows(&self, i: usize) -> Range<usize> {
        i * self.n_rbm..(i + 1) * self.n_rbm
    }
    /// Actuator columns of segment `i`
    pub fn actuator_cols(&self, i: usize) -> Range<usize> {
        i * self.n_actuator..(i + 1) * self.n_actuator
    }
    /// Expected shape of the assembled RBM gain matrix
    pub fn rbm_gain_shape(&self) -> (usize, usize) {
        (
            self.n_segment * self.n_rbm,
            self.n_segment * self.n_actuator,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmt_blocks() {
        let blocks = SegmentBlocks::default();
        assert_eq!(blocks.rbm_rows(0), 0..6);
        assert_eq!(blocks.rbm_rows(6), 36..42);
        assert_eq!(blocks.actuator_cols(1), 3..6);
        assert_eq!(blocks.rbm_gain_shape(), (42, 21));
    }
}
