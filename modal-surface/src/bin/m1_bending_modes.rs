//! Builds the M1 modal surface basis
//!
//! Rasterizes the segment singular modes pickle into a [MirrorModes] basis
//! and dumps it to a bincode archive:
//! ```shell
//! m1_bending_modes --n-mode 27 --resolution 512
//! ```
//! With the `--raw` flag, the basis is built from all the modes instead of
//! the rigid body motions null space ones.

use std::path::PathBuf;

use clap::Parser;
use gmt_dos_calibrations_modal_surface::{MirrorModes, SingularModes};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Segment singular modes pickle
    #[arg(long, default_value = "m1_singular_modes.pkl")]
    filename: PathBuf,
    /// Modal basis archive (default: m1_bending_modes.bin or
    /// m1_raw_bending_modes.bin with the --raw flag)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Number of modes kept per segment
    #[arg(short, long, default_value_t = 27)]
    n_mode: usize,
    /// Keeps all the modes, rigid body ones included
    #[arg(long)]
    raw: bool,
    /// Raster resolution in pixels
    #[arg(short, long, default_value_t = 256)]
    resolution: usize,
    /// Segment aperture diameter in meters
    #[arg(short, long, default_value_t = 8.5)]
    diameter: f64,
    /// Matfile for the mode-to-force matrices (B2F_1 to B2F_7)
    #[arg(long)]
    mode_to_force: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let segments = SingularModes::from_pickle(&args.filename)?;
    log::info!(
        "{} segments loaded from {:?}",
        segments.len(),
        args.filename
    );

    let mut mirror: Option<MirrorModes> = None;
    for (i, sms) in segments.iter().enumerate() {
        let mapping = if args.raw {
            sms.raw_mapping()?
        } else {
            sms.mapping(args.n_mode.min(sms.n_mode()))?
        };
        log::info!(
            "segment #{}: rasterizing {} modes from {} nodes",
            i + 1,
            mapping.n_mode(),
            mapping.n_node()
        );
        let basis = mapping.rasterize(args.resolution, args.diameter)?;
        match mirror.as_mut() {
            Some(mirror) => mirror.cat(basis, None)?,
            None => mirror = Some(MirrorModes::new(basis)),
        }
    }
    let mirror = mirror.ok_or_else(|| anyhow::anyhow!("empty modal data record"))?;

    let output = args.output.unwrap_or_else(|| {
        if args.raw {
            "m1_raw_bending_modes.bin".into()
        } else {
            "m1_bending_modes.bin".into()
        }
    });
    mirror.dump(&output)?;

    if let Some(path) = args.mode_to_force {
        SingularModes::save_mode_to_force(&segments, &path)?;
    }

    Ok(())
}
