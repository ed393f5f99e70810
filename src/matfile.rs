//! MAT-file records
//!
//! The per-segment collections of conversion matrices are saved with one
//! variable per segment, named `var0` to `var6`, matching the naming
//! expected by the downstream analysis tools.

use std::path::Path;

use matio_rs::MatFile;
use nalgebra as na;

use crate::Result;

/// Saves a collection of per-segment matrices, one `var{i}` variable each
pub fn save_segment_matrices(
    path: impl AsRef<Path>,
    mats: &[na::DMatrix<f64>],
) -> Result<()> {
    let mat_file = MatFile::save(path.as_ref())?;
    for (i, mat) in mats.iter().enumerate() {
        mat_file.var(format!("var{i}"), mat)?;
    }
    log::info!(
        "{} conversion matrices saved to {:?}",
        mats.len(),
        path.as_ref()
    );
    Ok(())
}

/// Saves a single named matrix
pub fn save_matrix(
    path: impl AsRef<Path>,
    name: &str,
    mat: &na::DMatrix<f64>,
) -> Result<()> {
    MatFile::save(path.as_ref())?.var(name, mat)?;
    log::info!("{name} saved to {:?}", path.as_ref());
    Ok(())
}

/// Loads a single named matrix
pub fn load_matrix(path: impl AsRef<Path>, name: &str) -> Result<na::DMatrix<f64>> {
    Ok(MatFile::load(path.as_ref())?.var(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_round_trip() {
        let path = std::env::temp_dir().join("gmt_dos-calibrations_matfile_round-trip.mat");
        let mat = na::DMatrix::from_fn(3, 4, |i, j| (i * 4 + j) as f64);
        save_matrix(&path, "m", &mat).unwrap();
        let back = load_matrix(&path, "m").unwrap();
        assert_eq!(mat, back);
    }

    #[test]
    fn segment_matrices() {
        let path = std::env::temp_dir().join("gmt_dos-calibrations_matfile_segments.mat");
        let mats: Vec<_> = (0..7)
            .map(|i| na::DMatrix::from_element(3, 3, i as f64))
            .collect();
        save_segment_matrices(&path, &mats).unwrap();
        for (i, mat) in mats.iter().enumerate() {
            let back = load_matrix(&path, &format!("var{i}")).unwrap();
            assert_eq!(mat, &back);
        }
    }
}
