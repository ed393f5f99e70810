use std::{fs::File, path::Path};

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::{CalibrationError, Result};

/// FEM static gain record
///
/// The record is the pickle written by the `static_gain` tool of the FEM
/// client: the column-major matrix buffer followed by the number of rows
/// and the number of columns, i.e. element `[i,j]` of the matrix is
/// `data[j*nrows + i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticGain(Vec<f64>, usize, usize);

impl StaticGain {
    pub fn new(data: Vec<f64>, nrows: usize, ncols: usize) -> Self {
        Self(data, nrows, ncols)
    }
    /// Loads a gain record from a pickle file
    pub fn from_pickle(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_pickle::from_reader(
            &mut File::open(path.as_ref())?,
            Default::default(),
        )?)
    }
    pub fn nrows(&self) -> usize {
        self.1
    }
    pub fn ncols(&self) -> usize {
        self.2
    }
    /// Rebuilds the gain matrix from the flat buffer
    ///
    /// Fails if the buffer length does not match the declared dimensions.
    pub fn matrix(&self) -> Result<na::DMatrix<f64>> {
        let Self(data, nrows, ncols) = self;
        if data.len() != nrows * ncols {
            return Err(CalibrationError::ShapeMismatch {
                nrows: *nrows,
                ncols: *ncols,
                len: data.len(),
            });
        }
        Ok(na::DMatrix::from_column_slice(*nrows, *ncols, data))
    }
}

impl From<na::DMatrix<f64>> for StaticGain {
    fn from(mat: na::DMatrix<f64>) -> Self {
        let (nrows, ncols) = mat.shape();
        Self(mat.as_slice().to_vec(), nrows, ncols)
    }
}
