//! Sky-grid construction.
//!
//! The multi-detector builder is a greedy rejection sampler: proposals drawn
//! from the localization distribution are accepted whenever they are farther
//! from every accepted point than the locally required angular spacing, which
//! follows from the tightest detector-pair timing constraint at that sky
//! position. Acceptance order matters; this is a covering point set, not an
//! optimal packing.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detector::{detector_pairs, Detector};
use crate::dist::{DistKind, SkyDistribution};
use crate::sky::SkyPoint;

/// Proposals per batch; the builder stops after a batch accepts nothing.
pub const BATCH_SIZE: usize = 10_000;

/// Relative floor for the spacing radicand. At the poles of a baseline the
/// pair carries no transverse timing information and the radicand vanishes;
/// the floor keeps the spacing finite (and enormous) instead of NaN.
const RADICAND_FLOOR: f64 = 1e-12;

/// A finalized search grid. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyGrid {
    pub points: Vec<SkyPoint>,
    /// Sorted alphabetically; pair enumeration and output files depend on it.
    pub instruments: Vec<Detector>,
    /// GPS reference time of the external trigger.
    pub trigger_time: f64,
    pub metadata: GridMetadata,
}

/// Output metadata, one of three shapes depending on how the localization
/// was specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GridMetadata {
    /// A named non-uniform input distribution, optionally restricted to a
    /// coverage fraction.
    InputDistribution {
        input_dist: String,
        coverage: Option<f64>,
        timing_uncertainty: f64,
    },
    /// The default uniform-sky distribution with no explicit center.
    AllSky {
        input_dist: String,
        timing_uncertainty: f64,
    },
    /// An explicit trigger center and error radius.
    ErrorBox {
        ra: f64,
        dec: f64,
        sky_error: f64,
        timing_uncertainty: f64,
    },
}

impl GridMetadata {
    /// Pick the metadata shape from the invocation mode. Shared by the
    /// single- and multi-detector branches.
    fn select(
        kind: DistKind,
        center_and_error: Option<(SkyPoint, f64)>,
        coverage: Option<f64>,
        timing_uncertainty: f64,
    ) -> Self {
        match (kind, center_and_error) {
            (DistKind::Fisher, _) => GridMetadata::InputDistribution {
                input_dist: kind.name().to_string(),
                coverage,
                timing_uncertainty,
            },
            (DistKind::UniformSky, None) => GridMetadata::AllSky {
                input_dist: kind.name().to_string(),
                timing_uncertainty,
            },
            (DistKind::UniformSky, Some((center, sky_error))) => GridMetadata::ErrorBox {
                ra: center.ra,
                dec: center.dec,
                sky_error,
                timing_uncertainty,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("at least one instrument is required")]
    NoInstruments,
    #[error("duplicate instrument {0}")]
    DuplicateInstrument(Detector),
    #[error("input distribution {0} requires --ra and --dec")]
    MissingCenter(&'static str),
    #[error("an explicit center requires --sky-error")]
    MissingSkyError,
    #[error("sky error must be positive, got {0}")]
    InvalidSkyError(f64),
    #[error("coverage must lie in (0, 1], got {0}")]
    InvalidCoverage(f64),
    #[error("timing uncertainty must be positive, got {0}")]
    InvalidTimingUncertainty(f64),
}

/// Everything needed to build a grid; mirrors the generator's command line.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub instruments: Vec<Detector>,
    pub trigger_time: f64,
    /// Per-detector arrival-time uncertainty, seconds.
    pub timing_uncertainty: f64,
    pub kind: DistKind,
    /// External-trigger center, if localized.
    pub center: Option<SkyPoint>,
    /// Angular error radius about the center, radians.
    pub sky_error: Option<f64>,
    /// Probability mass to enclose before sampling.
    pub coverage: Option<f64>,
}

impl GridConfig {
    /// Build the grid, drawing proposals from `rng`.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Result<SkyGrid, GridError> {
        let instruments = self.sorted_instruments()?;
        self.validate()?;

        let dist = self.distribution()?;
        // Seed at the mode; an unlocalized uniform sky seeds at the origin.
        let seed = dist.mode().unwrap_or(SkyPoint::ORIGIN);
        let metadata = GridMetadata::select(
            self.kind,
            self.center.zip(self.sky_error),
            self.coverage,
            self.timing_uncertainty,
        );

        // One detector cannot localize: degenerate one-point grid.
        if instruments.len() == 1 {
            return Ok(SkyGrid {
                points: vec![seed],
                instruments,
                trigger_time: self.trigger_time,
                metadata,
            });
        }

        let pairs = detector_pairs(&instruments);
        let mut points = vec![seed];
        let mut vectors = vec![seed.unit_vector()];

        let mut batches = 0usize;
        loop {
            let mut accepted = 0usize;
            for _ in 0..BATCH_SIZE {
                let proposal = dist.sample(rng);
                let spacing = required_spacing(
                    &pairs,
                    &proposal,
                    self.trigger_time,
                    self.timing_uncertainty,
                );
                // angle < spacing iff dot > cos(spacing); scanning dots lets
                // us bail on the first accepted point that is too close.
                let cos_spacing = spacing.min(std::f64::consts::PI).cos();
                let v = proposal.unit_vector();
                if vectors.iter().all(|u| u.dot(v) <= cos_spacing) {
                    points.push(proposal);
                    vectors.push(v);
                    accepted += 1;
                }
            }
            batches += 1;
            debug!(
                "batch {}: accepted {}, grid size {}",
                batches,
                accepted,
                points.len()
            );
            if accepted == 0 {
                break;
            }
        }

        Ok(SkyGrid {
            points,
            instruments,
            trigger_time: self.trigger_time,
            metadata,
        })
    }

    fn sorted_instruments(&self) -> Result<Vec<Detector>, GridError> {
        if self.instruments.is_empty() {
            return Err(GridError::NoInstruments);
        }
        let mut instruments = self.instruments.clone();
        instruments.sort();
        for w in instruments.windows(2) {
            if w[0] == w[1] {
                return Err(GridError::DuplicateInstrument(w[0]));
            }
        }
        Ok(instruments)
    }

    fn validate(&self) -> Result<(), GridError> {
        if self.timing_uncertainty <= 0.0 {
            return Err(GridError::InvalidTimingUncertainty(self.timing_uncertainty));
        }
        if let Some(err) = self.sky_error {
            if err <= 0.0 {
                return Err(GridError::InvalidSkyError(err));
            }
        }
        if let Some(f) = self.coverage {
            if !(f > 0.0 && f <= 1.0) {
                return Err(GridError::InvalidCoverage(f));
            }
        }
        if self.center.is_some() && self.sky_error.is_none() {
            return Err(GridError::MissingSkyError);
        }
        Ok(())
    }

    fn distribution(&self) -> Result<SkyDistribution, GridError> {
        let dist = match (self.kind, self.center) {
            (DistKind::Fisher, None) => {
                return Err(GridError::MissingCenter(self.kind.name()));
            }
            (DistKind::Fisher, Some(center)) => {
                SkyDistribution::fisher(center, self.sky_error.ok_or(GridError::MissingSkyError)?)
            }
            (DistKind::UniformSky, Some(center)) => SkyDistribution::uniform_disk(
                center,
                self.sky_error.ok_or(GridError::MissingSkyError)?,
            ),
            (DistKind::UniformSky, None) => SkyDistribution::UniformSky,
        };
        // Coverage restriction never applies to the default uniform sky.
        Ok(match (self.coverage, dist) {
            (Some(f), d) if d != SkyDistribution::UniformSky => d.shrink_to_coverage(f),
            (_, d) => d,
        })
    }
}

/// Locally required angular spacing at `point`: 2 sigma_t / sqrt(T^2 - d^2),
/// minimized over detector pairs (T the light-travel time, d the time delay).
/// The pair with the tightest timing constraint dominates.
pub fn required_spacing(
    pairs: &[(Detector, Detector)],
    point: &SkyPoint,
    trigger_time: f64,
    timing_uncertainty: f64,
) -> f64 {
    let mut spacing = f64::INFINITY;
    for &(a, b) in pairs {
        let t = a.light_travel_time(b);
        let delay = a.time_delay(b, point, trigger_time);
        let radicand = (t * t - delay * delay).max(RADICAND_FLOOR * t * t);
        spacing = spacing.min(2.0 * timing_uncertainty / radicand.sqrt());
    }
    spacing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> GridConfig {
        GridConfig {
            instruments: vec![Detector::H1, Detector::L1],
            trigger_time: 1_000_000_000.0,
            timing_uncertainty: 5e-4,
            kind: DistKind::UniformSky,
            center: None,
            sky_error: None,
            coverage: None,
        }
    }

    #[test]
    fn test_metadata_shapes() {
        let center = SkyPoint::new(1.0, -0.5);

        let m = GridMetadata::select(DistKind::Fisher, Some((center, 0.1)), Some(0.9), 5e-4);
        assert_eq!(
            m,
            GridMetadata::InputDistribution {
                input_dist: "fisher_sky".to_string(),
                coverage: Some(0.9),
                timing_uncertainty: 5e-4,
            }
        );

        let m = GridMetadata::select(DistKind::UniformSky, None, None, 5e-4);
        assert_eq!(
            m,
            GridMetadata::AllSky {
                input_dist: "uniform_sky".to_string(),
                timing_uncertainty: 5e-4,
            }
        );

        let m = GridMetadata::select(DistKind::UniformSky, Some((center, 0.1)), None, 5e-4);
        assert_eq!(
            m,
            GridMetadata::ErrorBox {
                ra: 1.0,
                dec: -0.5,
                sky_error: 0.1,
                timing_uncertainty: 5e-4,
            }
        );
    }

    #[test]
    fn test_spacing_is_minimum_over_pairs() {
        let trio = detector_pairs(&[Detector::H1, Detector::L1, Detector::V1]);
        let p = SkyPoint::new(0.7, 0.2);
        let all = required_spacing(&trio, &p, 1.2e9, 5e-4);
        for &pair in &trio {
            let single = required_spacing(&[pair], &p, 1.2e9, 5e-4);
            assert!(all <= single + 1e-15);
        }
        assert!(all.is_finite() && all > 0.0);
    }

    #[test]
    fn test_spacing_degenerate_radicand_is_finite() {
        // A point along the H1-L1 baseline axis: |delay| approaches the
        // light-travel time and the radicand collapses to the floor.
        let pairs = detector_pairs(&[Detector::H1, Detector::L1]);
        let baseline = (Detector::L1.vertex() - Detector::H1.vertex()).normalize();
        let gmst = crate::detector::gmst_from_gps(1.2e9);
        let dec = baseline.z.asin();
        let ra = gmst - (-baseline.y).atan2(baseline.x);
        let p = SkyPoint::new(ra.rem_euclid(std::f64::consts::TAU), dec);

        let t = Detector::H1.light_travel_time(Detector::L1);
        let delay = Detector::H1.time_delay(Detector::L1, &p, 1.2e9);
        assert!((delay.abs() - t).abs() < 1e-6 * t, "not on baseline axis");

        let spacing = required_spacing(&pairs, &p, 1.2e9, 5e-4);
        assert!(spacing.is_finite());
        assert!(spacing > std::f64::consts::PI);
    }

    #[test]
    fn test_duplicate_instrument_rejected() {
        let mut config = base_config();
        config.instruments = vec![Detector::H1, Detector::H1];
        let mut rng = rand::thread_rng();
        assert!(matches!(
            config.build(&mut rng),
            Err(GridError::DuplicateInstrument(Detector::H1))
        ));
    }

    #[test]
    fn test_center_requires_sky_error() {
        let mut config = base_config();
        config.center = Some(SkyPoint::new(1.0, 0.0));
        let mut rng = rand::thread_rng();
        assert!(matches!(
            config.build(&mut rng),
            Err(GridError::MissingSkyError)
        ));
    }

    #[test]
    fn test_fisher_requires_center() {
        let mut config = base_config();
        config.kind = DistKind::Fisher;
        config.sky_error = Some(0.1);
        let mut rng = rand::thread_rng();
        assert!(matches!(
            config.build(&mut rng),
            Err(GridError::MissingCenter(_))
        ));
    }

    #[test]
    fn test_coverage_out_of_range_rejected() {
        let mut config = base_config();
        config.coverage = Some(1.5);
        let mut rng = rand::thread_rng();
        assert!(matches!(
            config.build(&mut rng),
            Err(GridError::InvalidCoverage(_))
        ));
    }
}
