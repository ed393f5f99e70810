//! M2 POSITIONER DISPLACEMENT TO M2 RBM
//!
//! Computes the global transform from the M2 positioner displacements to the
//! M2 segment rigid body motions:
//! ```shell
//! cargo run -r --bin hex_to_rbm -- --k1 hex_f2d.pkl --k2 hex_f2r.pkl
//! ```

use clap::Parser;
use gmt_dos_calibrations::{hex_displacement_to_rbm, matfile, Inversion, StaticGain};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// positioner forces to positioner displacements static gain
    #[arg(long, default_value = "hex_f2d.pkl")]
    k1: String,
    /// positioner forces to M2 RBM static gain
    #[arg(long, default_value = "hex_f2r.pkl")]
    k2: String,
    /// transform filename
    #[arg(short, long, default_value = "m2_hex_d2r.mat")]
    filename: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let k1 = StaticGain::from_pickle(&args.k1)?;
    let k2 = StaticGain::from_pickle(&args.k2)?;
    let d2r = hex_displacement_to_rbm(&k1, &k2, Inversion::Direct)?;
    matfile::save_matrix(&args.filename, "d2r", &d2r)?;

    Ok(())
}
