use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use skygrid::util::Timed;
use skygrid::{write_grid, Detector, DistKind, GridConfig, SkyPoint};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliDetector {
    #[value(name = "H1", alias = "h1")]
    H1,
    #[value(name = "L1", alias = "l1")]
    L1,
    #[value(name = "V1", alias = "v1")]
    V1,
    #[value(name = "K1", alias = "k1")]
    K1,
    #[value(name = "G1", alias = "g1")]
    G1,
}

impl From<CliDetector> for Detector {
    fn from(value: CliDetector) -> Self {
        match value {
            CliDetector::H1 => Detector::H1,
            CliDetector::L1 => Detector::L1,
            CliDetector::V1 => Detector::V1,
            CliDetector::K1 => Detector::K1,
            CliDetector::G1 => Detector::G1,
        }
    }
}

/// Build a sky-position search grid for a multi-detector trigger.
#[derive(Parser, Debug)]
#[command(name = "make_sky_grid", version, about)]
struct Cli {
    /// Right ascension of the external trigger, radians
    #[arg(long, requires = "dec")]
    ra: Option<f64>,

    /// Declination of the external trigger, radians
    #[arg(long, requires = "ra")]
    dec: Option<f64>,

    /// Detector names
    #[arg(long, value_enum, num_args = 1.., required = true)]
    instruments: Vec<CliDetector>,

    /// Angular error radius of the trigger localization, radians
    #[arg(long)]
    sky_error: Option<f64>,

    /// Input sky distribution (UniformSky() or FisherSky())
    #[arg(long, default_value = "UniformSky()")]
    input_dist: DistKind,

    /// Probability mass of the localization to enclose before sampling
    #[arg(long)]
    coverage: Option<f64>,

    /// GPS reference time of the trigger
    #[arg(long)]
    trigger_time: f64,

    /// Per-detector arrival-time uncertainty, seconds
    #[arg(long, default_value_t = 5e-4)]
    timing_uncertainty: f64,

    /// Random seed for the proposal sampler (entropy if unset)
    #[arg(long)]
    seed: Option<u64>,

    /// Output grid file (.json or .json.gz)
    #[arg(long)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = GridConfig {
        instruments: cli.instruments.iter().map(|&d| Detector::from(d)).collect(),
        trigger_time: cli.trigger_time,
        timing_uncertainty: cli.timing_uncertainty,
        kind: cli.input_dist,
        center: cli.ra.zip(cli.dec).map(|(ra, dec)| SkyPoint::new(ra, dec)),
        sky_error: cli.sky_error,
        coverage: cli.coverage,
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let grid = {
        let _t = Timed::info("Grid construction");
        config.build(&mut rng)?
    };
    log::info!(
        "{} grid points for {} instruments at GPS {}",
        grid.points.len(),
        grid.instruments.len(),
        grid.trigger_time
    );

    write_grid(&grid, &cli.output)
        .with_context(|| format!("writing grid to {}", cli.output.display()))?;
    log::info!("Wrote {}", cli.output.display());
    Ok(())
}
