/*!
# GMT MIRROR CALIBRATION MATRICES

Derivation of the matrix transforms between the mirror actuation and sensing
spaces and the segment rigid body motions.

All the transforms are computed from FEM static gain matrices saved with the
`static_gain` tool of the FEM client, e.g. for the FSM piezo actuators:
```shell
cargo run -r -p gmt_dos-clients_fem --bin static_gain --features="serde clap" -- \
    -i MC_M2_PZT_F -o MC_M2_lcl_6D -f pzt_2_rbm.pkl
cargo run -r -p gmt_dos-clients_fem --bin static_gain --features="serde clap" -- \
    -i MC_M2_PZT_F -o MC_M2_PZT_D -f pzt_f2d.pkl
```
A gain matrix is saved as the triplet `(data,n,m)` where `data` is the
column-major matrix buffer and `(n,m)` the matrix dimensions ([StaticGain]).

The PZT actuators and the mirror positioners are mounted as push/pull pairs:
differencing the even and odd channels ([algebra::push_pull_columns],
[algebra::push_pull_rows], [algebra::push_pull_pairs]) collapses each pair
into a single signed channel.

## FSM PZT TO M2 RBM

With $K_1$ the gain from PZT forces to M2 rigid body motions and $K_2$ the
gain from PZT forces to PZT displacements, let
$K_1^\prime = \Delta_{col}(K_1)$, $K_2^\prime = \Delta_{pair}(K_2)$ and
$L = diag(K_2^\prime)$.

The per-segment transforms derived by [FsmCalibration] are, for segment $i$:
 * PZT displacements to tip/tilt/piston:
   $K_1^\prime[6i+3..6i+6, 3i..3i+3] \, L_i^{-1}$,
 * tip/tilt to PZT displacements (RCO flavor):
   $L_i \, {K_1^\prime[6i+2..6i+5, 3i..3i+3]}^{+}$,
 * tip/tilt to PZT displacements (PTH flavor):
   $V \, (K_1^\prime[6i+3..6i+5, 3i..3i+3] \, L_i^{-1} \, V)^{-1}$,
   where $V$ holds the 3 actuator unit vectors at 0 and &pm;120 degrees
   decomposed on the tip/tilt axes,
 * PZT displacements to the full 6 rigid body motions:
   $K_1^\prime[6i..6i+6, 3i..3i+3] \, L_i^{-1} \, O$ with
   $O = I_3 \otimes [1,-1]$.

The reference derivations disagreed on the inversion of the per-segment
blocks, using either the plain inverse or the SVD pseudo-inverse; the choice
is left to the caller through [Inversion].

## M1 EDGE SENSORS TO M1 RBM

With $K_1$ the gain from hardpoint forces to M1 rigid body motions, $K_2$
the gain from hardpoint forces to edge sensor displacements and $A_1$ the
edge sensor conversion matrix, the transform from edge sensor readings to
rigid body motions is the minimum-norm solution $X$ of
$$ {(A_1 K_2)[:, :36]}^T X = {K_1[:36, :36]}^T$$
padded below with 6 zero rows (the rigid body motions of S7 are not observed
by the edge sensors) and restored to the sensor basis by a right
multiplication with $A_1$ ([edge_sensors_to_rbm]).

## M2 POSITIONER DISPLACEMENT TO M2 RBM

With $K_1$ the gain from positioner forces to positioner displacements and
$K_2$ the gain from positioner forces to M2 rigid body motions:
$$ D2R = \Delta_{col}(K_2) \, {\Delta_{pair}(K_1)}^{-1}$$
([hex_displacement_to_rbm]).

The per-segment block offsets are given by [SegmentBlocks] and the resulting
collections of matrices are saved to MAT-files with [matfile::save_segment_matrices].
*/

pub mod algebra;
mod edge_sensors;
mod hexapod;
pub mod matfile;
mod pzt;
mod segment;
mod static_gain;

pub use algebra::Inversion;
pub use edge_sensors::edge_sensors_to_rbm;
pub use hexapod::hex_displacement_to_rbm;
pub use pzt::FsmCalibration;
pub use segment::SegmentBlocks;
pub use static_gain::StaticGain;

#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("failed to load data from matfile")]
    MatFile(#[from] matio_rs::MatioError),
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("failed to read static gain record")]
    Pickle(#[from] serde_pickle::Error),
    #[error("expected a buffer of {nrows}x{ncols}={} elements, found {len}", nrows * ncols)]
    ShapeMismatch {
        nrows: usize,
        ncols: usize,
        len: usize,
    },
    #[error("expected matrix size {0:?}, found {1:?}")]
    MatrixSizeMismatch((usize, usize), (usize, usize)),
    #[error("singular {0} conversion block")]
    Singular(String),
    #[error("failed to compute the pseudo-inverse of the {0} conversion block: {1}")]
    PseudoInverse(String, String),
}

pub type Result<T> = std::result::Result<T, CalibrationError>;
