use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use plotters::prelude::*;

use skygrid::read_grid;

/// Render a sky grid as a diagnostic RA/dec scatter figure.
#[derive(Parser, Debug)]
#[command(name = "plot_sky_grid", version, about)]
struct Cli {
    /// Grid file produced by make_sky_grid
    #[arg(long)]
    input: PathBuf,

    /// Output PNG file
    #[arg(long = "output-file")]
    output_file: PathBuf,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let grid = read_grid(&cli.input)
        .with_context(|| format!("reading grid from {}", cli.input.display()))?;
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");

    let instruments = grid
        .instruments
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(" ");
    let title = format!(
        "Sky grid: {} points, {} @ GPS {}",
        grid.points.len(),
        instruments,
        grid.trigger_time
    );

    let root = BitMapBackend::new(&cli.output_file, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;
    // Bottom strip carries the invoking command as a caption.
    let (chart_area, caption_area) = root.split_vertically(cli.height as i32 - 36);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..360.0, -90.0..90.0)?;
    chart
        .configure_mesh()
        .x_desc("Right ascension (deg)")
        .y_desc("Declination (deg)")
        .draw()?;
    chart.draw_series(
        grid.points
            .iter()
            .map(|p| Circle::new((p.ra.to_degrees(), p.dec.to_degrees()), 3, BLUE.filled())),
    )?;

    caption_area.draw_text(
        &command_line,
        &TextStyle::from(("sans-serif", 14)).color(&BLACK),
        (10, 12),
    )?;
    root.present()?;

    log::info!("Wrote {}", cli.output_file.display());
    Ok(())
}
