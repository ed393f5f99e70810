//! M2 RBM TO FSM PZT
//!
//! Computes the per-segment transforms from the M2 segment tip/tilt to the
//! FSM PZT displacements:
//! ```shell
//! cargo run -r --bin rbm_to_pzt -- --flavor pth
//! ```
//!
//! The 2 flavors differ in the rigid body motion rows they fold onto the
//! actuators and in their default inversion strategy.

use clap::{Parser, ValueEnum};
use gmt_dos_calibrations::{matfile, FsmCalibration, Inversion, SegmentBlocks, StaticGain};

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum Flavor {
    /// piston and rotation rows, pseudo-inverse
    Rco,
    /// tip/tilt rows folded on the actuator axes, plain inverse
    Pth,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum Strategy {
    Direct,
    PseudoInverse,
}

impl From<Strategy> for Inversion {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Direct => Inversion::Direct,
            Strategy::PseudoInverse => Inversion::PseudoInverse,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// PZT forces to M2 RBM static gain
    #[arg(long, default_value = "pzt_2_rbm.pkl")]
    k1: String,
    /// PZT forces to PZT displacements static gain
    #[arg(long, default_value = "pzt_f2d.pkl")]
    k2: String,
    /// transform derivation flavor
    #[arg(long, value_enum, default_value_t = Flavor::Pth)]
    flavor: Flavor,
    /// block inversion strategy, defaults to the flavor reference strategy
    #[arg(long, value_enum)]
    inversion: Option<Strategy>,
    /// transforms filename, defaults to `rbm_2_pzt_{flavor}.mat`
    #[arg(short, long)]
    filename: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let k1 = StaticGain::from_pickle(&args.k1)?;
    let k2 = StaticGain::from_pickle(&args.k2)?;
    let fsm = FsmCalibration::new(&k1, &k2, SegmentBlocks::default())?;

    let (mats, filename) = match args.flavor {
        Flavor::Rco => {
            let inversion = args
                .inversion
                .map_or(Inversion::PseudoInverse, Inversion::from);
            (
                fsm.rbm_to_pzt_rco(inversion)?,
                args.filename.unwrap_or("rbm_2_pzt_rco.mat".to_string()),
            )
        }
        Flavor::Pth => {
            let inversion = args.inversion.map_or(Inversion::Direct, Inversion::from);
            (
                fsm.rbm_to_pzt_pth(inversion)?,
                args.filename.unwrap_or("rbm_2_pzt_pth.mat".to_string()),
            )
        }
    };
    matfile::save_segment_matrices(&filename, &mats)?;

    Ok(())
}
