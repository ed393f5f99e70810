//! FSM PZT TO M2 RBM
//!
//! Computes the per-segment transforms from the FSM PZT displacements to the
//! M2 segment rigid body motions:
//! ```shell
//! cargo run -r --bin pzt_to_rbm -- --k1 pzt_2_rbm.pkl --k2 pzt_f2d.pkl
//! ```

use clap::Parser;
use gmt_dos_calibrations::{matfile, FsmCalibration, SegmentBlocks, StaticGain};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// PZT forces to M2 RBM static gain
    #[arg(long, default_value = "pzt_2_rbm.pkl")]
    k1: String,
    /// PZT forces to PZT displacements static gain
    #[arg(long, default_value = "pzt_f2d.pkl")]
    k2: String,
    /// tip/tilt/piston transforms filename
    #[arg(short, long, default_value = "pzt_d_2_rbm.mat")]
    filename: String,
    /// full 6 DOF transforms filename
    #[arg(long, default_value = "m2_pzt_r.mat")]
    full_filename: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let k1 = StaticGain::from_pickle(&args.k1)?;
    let k2 = StaticGain::from_pickle(&args.k2)?;
    let fsm = FsmCalibration::new(&k1, &k2, SegmentBlocks::default())?;

    matfile::save_segment_matrices(&args.filename, &fsm.pzt_displacement_to_rbm()?)?;
    matfile::save_segment_matrices(&args.full_filename, &fsm.pzt_to_full_rbm()?)?;

    Ok(())
}
