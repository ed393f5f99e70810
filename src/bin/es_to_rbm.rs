//! M1 EDGE SENSORS TO M1 RBM
//!
//! Computes the transform from the M1 edge sensor readings to the M1
//! segment rigid body motions:
//! ```shell
//! cargo run -r --bin es_to_rbm -- \
//!     --k1 hardpoints_2_rbm.pkl --k2 hardpoints_2_edge-sensors.pkl \
//!     --conversion M1_edge_sensor_conversion.mat
//! ```

use clap::Parser;
use gmt_dos_calibrations::{edge_sensors_to_rbm, matfile, SegmentBlocks, StaticGain};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// hardpoint forces to M1 RBM static gain
    #[arg(long, default_value = "hardpoints_2_rbm.pkl")]
    k1: String,
    /// hardpoint forces to edge sensors static gain
    #[arg(long, default_value = "hardpoints_2_edge-sensors.pkl")]
    k2: String,
    /// edge sensor conversion MAT-file
    #[arg(long, default_value = "M1_edge_sensor_conversion.mat")]
    conversion: String,
    /// edge sensor conversion variable name
    #[arg(long, default_value = "A1")]
    var: String,
    /// transform filename
    #[arg(short, long, default_value = "es_2_rbm.mat")]
    filename: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let k1 = StaticGain::from_pickle(&args.k1)?.matrix()?;
    let k2 = StaticGain::from_pickle(&args.k2)?.matrix()?;
    let a1 = matfile::load_matrix(&args.conversion, &args.var)?;

    // all the segments but the center one are observed
    let blocks = SegmentBlocks::default();
    let n_dof = (blocks.n_segment - 1) * blocks.n_rbm;
    let m1_r_es = edge_sensors_to_rbm(&k1, &k2, &a1, n_dof)?;
    matfile::save_matrix(&args.filename, "m1_r_es", &m1_r_es)?;

    Ok(())
}
