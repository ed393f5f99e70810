use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{ModalSurfaceError, Result};

/// Rasterized mode set of a single segment
///
/// The raster block holds one `resolution x resolution` surface map per
/// mode, column-major, `y` running fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBasis {
    resolution: usize,
    diameter: f64,
    n_mode: usize,
    raster: Vec<f64>,
}

impl SegmentBasis {
    pub(crate) fn new(resolution: usize, diameter: f64, n_mode: usize, raster: Vec<f64>) -> Self {
        Self {
            resolution,
            diameter,
            n_mode,
            raster,
        }
    }
    pub fn resolution(&self) -> usize {
        self.resolution
    }
    pub fn diameter(&self) -> f64 {
        self.diameter
    }
    pub fn n_mode(&self) -> usize {
        self.n_mode
    }
    /// Surface map of mode `m`
    pub fn mode(&self, m: usize) -> &[f64] {
        let n = self.resolution * self.resolution;
        &self.raster[m * n..(m + 1) * n]
    }
    /// Appends zero modes up to `n_mode`
    pub fn pad_to(&mut self, n_mode: usize) {
        if n_mode > self.n_mode {
            self.raster
                .resize(self.resolution * self.resolution * n_mode, 0.);
            self.n_mode = n_mode;
        }
    }
}

/// Mirror-wide modal basis
///
/// The concatenation of the rasterized mode sets of all the segments.
/// Segments may share a mode set: `segment_to_bin[i]` is the index of the
/// mode set of segment `i` in the `bins` stack. All the mode sets share
/// the same raster resolution, aperture diameter and mode count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorModes {
    resolution: usize,
    diameter: f64,
    n_mode: usize,
    segment_to_bin: Vec<usize>,
    bins: Vec<SegmentBasis>,
}

impl MirrorModes {
    /// Creates a basis holding the mode set of the first segment
    pub fn new(basis: SegmentBasis) -> Self {
        Self {
            resolution: basis.resolution,
            diameter: basis.diameter,
            n_mode: basis.n_mode,
            segment_to_bin: vec![0],
            bins: vec![basis],
        }
    }
    /// Appends the next segment to the basis
    ///
    /// A new mode set is stacked as a new bin unless `bin` points to an
    /// already stacked one. Fails on a raster geometry mismatch; a mode
    /// count mismatch is resolved by zero-padding the short side.
    pub fn cat(&mut self, basis: SegmentBasis, bin: Option<usize>) -> Result<()> {
        match bin {
            Some(bin) if bin < self.bins.len() => {
                self.segment_to_bin.push(bin);
                Ok(())
            }
            _ => {
                if basis.resolution != self.resolution || basis.diameter != self.diameter {
                    return Err(ModalSurfaceError::GeometryMismatch(
                        self.resolution,
                        self.diameter,
                        basis.resolution,
                        basis.diameter,
                    ));
                }
                let mut basis = basis;
                if basis.n_mode < self.n_mode {
                    basis.pad_to(self.n_mode);
                } else if basis.n_mode > self.n_mode {
                    self.n_mode = basis.n_mode;
                    self.bins.iter_mut().for_each(|b| b.pad_to(basis.n_mode));
                }
                self.segment_to_bin.push(self.bins.len());
                self.bins.push(basis);
                Ok(())
            }
        }
    }
    pub fn resolution(&self) -> usize {
        self.resolution
    }
    pub fn diameter(&self) -> f64 {
        self.diameter
    }
    pub fn n_mode(&self) -> usize {
        self.n_mode
    }
    pub fn n_segment(&self) -> usize {
        self.segment_to_bin.len()
    }
    /// Mode set of segment `i`
    pub fn segment(&self, i: usize) -> &SegmentBasis {
        &self.bins[self.segment_to_bin[i]]
    }
    /// Mirror surface deformation map for the given per-segment mode
    /// amplitudes, `n_mode` amplitudes per segment
    pub fn surface(&self, coefs: &[f64]) -> Result<Vec<f64>> {
        let expected = self.n_segment() * self.n_mode;
        if coefs.len() != expected {
            return Err(ModalSurfaceError::ModeCountMismatch {
                n_mode: coefs.len(),
                found: expected,
            });
        }
        let n = self.resolution * self.resolution;
        let mut surface = vec![0f64; n];
        for (i, coefs) in coefs.chunks(self.n_mode).enumerate() {
            let basis = self.segment(i);
            for (m, &c) in coefs.iter().enumerate() {
                if c != 0. {
                    surface
                        .iter_mut()
                        .zip(basis.mode(m))
                        .for_each(|(s, z)| *s += c * z);
                }
            }
        }
        Ok(surface)
    }
    /// Serializes the basis to a file
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        bincode::serialize_into(&mut writer, self)?;
        log::info!(
            "modal basis ({} segments, {} modes) dumped to {:?}",
            self.n_segment(),
            self.n_mode,
            path.as_ref()
        );
        Ok(())
    }
    /// Restores a basis from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        Ok(bincode::deserialize_from(&mut reader)?)
    }
}
