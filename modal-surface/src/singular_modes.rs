use std::{fs::File, path::Path};

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::{Mapping, ModalSurfaceError, Result};

/// M1 segment singular modes (a.k.a. bending modes)
///
/// The record of the FEM modal decomposition of one segment, as exported by
/// the `mirror_singular_modes` tool of the FEM client. With
/// `shape = (r, c)`, `r` mesh nodes and `c` actuators, the column-major
/// mode buffers hold one mode per column sampled at the mesh nodes:
/// `raw_modes` keeps all the modes whereas `modes` is restricted to the
/// null space of the 6 rigid body motions.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SingularModes {
    /// segment mesh vertex coordinates `[x,y,z]`
    mode_nodes: Vec<Vec<f64>>,
    /// segment actuator locations `[x,y,z]`
    actuator_nodes: Vec<Vec<f64>>,
    /// segment singular modes
    raw_modes: Vec<f64>,
    /// segment singular modes restricted to the rigid body motions null space
    modes: Vec<f64>,
    /// modes to forces matrix transform
    mode_2_force: Vec<f64>,
    /// modes shape `[n_nodes,n_actuators]`
    shape: (usize, usize),
}

impl SingularModes {
    pub fn new(
        mode_nodes: Vec<Vec<f64>>,
        actuator_nodes: Vec<Vec<f64>>,
        raw_modes: Vec<f64>,
        modes: Vec<f64>,
        mode_2_force: Vec<f64>,
        shape: (usize, usize),
    ) -> Self {
        Self {
            mode_nodes,
            actuator_nodes,
            raw_modes,
            modes,
            mode_2_force,
            shape,
        }
    }
    /// Loads the whole mirror modal data, one record per segment
    pub fn from_pickle(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        Ok(serde_pickle::from_reader(
            &mut File::open(path.as_ref())?,
            Default::default(),
        )?)
    }
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }
    /// Number of modes outside the rigid body motions null space
    pub fn n_mode(&self) -> usize {
        self.modes.len() / self.shape.0
    }
    /// Number of modes including the rigid body ones
    pub fn n_raw_mode(&self) -> usize {
        self.raw_modes.len() / self.shape.0
    }
    /// Mesh node `(x,y)` coordinates
    pub fn nodes_xy(&self) -> (Vec<f64>, Vec<f64>) {
        self.mode_nodes
            .iter()
            .map(|node| (node[0], node[1]))
            .unzip()
    }
    /// Actuator `(x,y)` coordinates
    pub fn actuators_xy(&self) -> (Vec<f64>, Vec<f64>) {
        self.actuator_nodes
            .iter()
            .map(|node| (node[0], node[1]))
            .unzip()
    }

    fn matrix(&self, buffer: &[f64], ncols: usize) -> Result<na::DMatrix<f64>> {
        let nrows = self.shape.0;
        if buffer.len() != nrows * ncols {
            return Err(ModalSurfaceError::ShapeMismatch {
                nrows,
                ncols,
                len: buffer.len(),
            });
        }
        Ok(na::DMatrix::from_column_slice(nrows, ncols, buffer))
    }
    /// Mode shapes restricted to the rigid body motions null space,
    /// one mode per column
    pub fn modes_matrix(&self) -> Result<na::DMatrix<f64>> {
        self.matrix(&self.modes, self.n_mode())
    }
    /// All the mode shapes, one mode per column
    pub fn raw_modes_matrix(&self) -> Result<na::DMatrix<f64>> {
        self.matrix(&self.raw_modes, self.n_raw_mode())
    }
    /// Mode coefficients to actuator forces transform
    pub fn mode_to_force_matrix(&self) -> Result<na::DMatrix<f64>> {
        let n = self.mode_2_force.len() / self.shape.1;
        let nrows = self.shape.1;
        if self.mode_2_force.len() != nrows * n {
            return Err(ModalSurfaceError::ShapeMismatch {
                nrows,
                ncols: n,
                len: self.mode_2_force.len(),
            });
        }
        Ok(na::DMatrix::from_column_slice(nrows, n, &self.mode_2_force))
    }

    /// Saves the mode-to-force matrices of all the segments to a MAT-file,
    /// one `B2F_{i}` variable per segment, `i` starting at 1
    pub fn save_mode_to_force(segments: &[Self], path: impl AsRef<Path>) -> Result<()> {
        let mat_file = matio_rs::MatFile::save(path.as_ref())?;
        for (i, sms) in segments.iter().enumerate() {
            mat_file.var(format!("B2F_{}", i + 1), &sms.mode_to_force_matrix()?)?;
        }
        log::info!(
            "{} mode-to-force matrices saved to {:?}",
            segments.len(),
            path.as_ref()
        );
        Ok(())
    }

    /// Mesh-to-raster mapping of the first `n_mode` null space modes
    pub fn mapping(&self, n_mode: usize) -> Result<Mapping> {
        let modes = self.modes_matrix()?;
        if n_mode > modes.ncols() {
            return Err(ModalSurfaceError::ModeCountMismatch {
                n_mode,
                found: modes.ncols(),
            });
        }
        let (x, y) = self.nodes_xy();
        Mapping::new(x, y, modes.view_range(.., ..n_mode).into_owned())
    }
    /// Mesh-to-raster mapping of all the modes
    pub fn raw_mapping(&self) -> Result<Mapping> {
        let (x, y) = self.nodes_xy();
        Mapping::new(x, y, self.raw_modes_matrix()?)
    }
}
