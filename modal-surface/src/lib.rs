/*!
# M1 MODAL SURFACE BASIS

Rasterization of the M1 segment singular modes (a.k.a. bending modes) into a
mirror-wide modal basis.

The per-segment modal data is the pickle written by the
`mirror_singular_modes` tool of the FEM client: for each of the 7 segments,
the mesh node coordinates, the actuator locations and the mode shapes
sampled at the mesh nodes ([SingularModes]).

Each segment mode set is interpolated from its irregular FEM mesh onto a
uniform square raster ([Mapping]) and the 7 rasterized sets are
concatenated, with a segment-to-bin assignment, into a single [MirrorModes]
basis which maps per-segment mode amplitudes to mirror surface deformation
maps. The basis is serialized to disk with [MirrorModes::dump] and restored
with [MirrorModes::load], bit for bit.

All the segments of a basis share the same raster resolution, aperture
diameter and mode count: concatenation fails on mismatched geometries and
zero-pads segments that fall short on modes.
*/

mod basis;
mod mapping;
mod singular_modes;

pub use basis::{MirrorModes, SegmentBasis};
pub use mapping::Mapping;
pub use singular_modes::SingularModes;

#[derive(Debug, thiserror::Error)]
pub enum ModalSurfaceError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("failed to read modal data record")]
    Pickle(#[from] serde_pickle::Error),
    #[error("failed to serialize the modal basis")]
    Bincode(#[from] bincode::Error),
    #[error("failed to save data to matfile")]
    MatFile(#[from] matio_rs::MatioError),
    #[error("expected a buffer of {nrows}x{ncols}={} elements, found {len}", nrows * ncols)]
    ShapeMismatch {
        nrows: usize,
        ncols: usize,
        len: usize,
    },
    #[error("expected {expected} nodes, found {found}")]
    NodesMismatch { expected: usize, found: usize },
    #[error("expected a {0}x{0} raster spanning {1}m, found a {2}x{2} raster spanning {3}m")]
    GeometryMismatch(usize, f64, usize, f64),
    #[error("cannot take {n_mode} modes out of {found}")]
    ModeCountMismatch { n_mode: usize, found: usize },
    #[error("raster mapping failed: {0}")]
    Raster(String),
}

pub type Result<T> = std::result::Result<T, ModalSurfaceError>;
