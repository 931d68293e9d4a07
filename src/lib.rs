//! Sky-position search grids for multi-detector gravitational-wave triggers.
//!
//! Given an external trigger's sky localization (uniform sky, Fisher error
//! region, or explicit center plus error radius) and a detector network, the
//! grid builder produces a discrete set of (ra, dec) points such that any
//! true source position lies within one angular-resolution cell of a grid
//! point, where resolution follows from detector-pair timing uncertainty.

pub mod detector;
pub mod dist;
pub mod export;
pub mod grid;
pub mod sky;
pub mod util;

pub use detector::{detector_pairs, gmst_from_gps, Detector};
pub use dist::{DistKind, SkyDistribution};
pub use export::{read_grid, write_grid, ExportError};
pub use grid::{required_spacing, GridConfig, GridError, GridMetadata, SkyGrid};
pub use sky::SkyPoint;
