//! Grid file I/O: JSON, gzipped when the path ends in `.gz`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

use crate::grid::SkyGrid;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Write a grid to `path` as JSON (gzipped for `.gz` paths).
pub fn write_grid(grid: &SkyGrid, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    if is_gzip(path) {
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(encoder, grid)?;
    } else {
        serde_json::to_writer(BufWriter::new(file), grid)?;
    }
    Ok(())
}

/// Read a grid previously written by [`write_grid`].
pub fn read_grid(path: &Path) -> Result<SkyGrid, ExportError> {
    let file = File::open(path)?;
    let grid = if is_gzip(path) {
        serde_json::from_reader(GzDecoder::new(BufReader::new(file)))?
    } else {
        serde_json::from_reader(BufReader::new(file))?
    };
    Ok(grid)
}
