//! Sky-localization distributions used to propose grid points.
//!
//! A fixed variant enumeration replaces the original tool's dynamic
//! distribution-name evaluation: uniform over the whole sky, a Fisher
//! (von Mises) error region, or a uniform disk around an explicit center.

use std::f64::consts::TAU;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

use crate::sky::SkyPoint;

/// The distribution named by the `--input-dist` flag.
///
/// A uniform-disk distribution is never named directly; it is constructed
/// from an explicit center and error radius when the input distribution is
/// left at its uniform default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistKind {
    UniformSky,
    Fisher,
}

impl DistKind {
    pub fn name(&self) -> &'static str {
        match self {
            DistKind::UniformSky => "uniform_sky",
            DistKind::Fisher => "fisher_sky",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown input distribution \"{0}\" (expected UniformSky or FisherSky)")]
pub struct UnknownDistribution(String);

impl FromStr for DistKind {
    type Err = UnknownDistribution;

    /// Accepts the `UniformSky()` / `FisherSky()` spellings of the original
    /// command line as well as plain lowercase names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_end_matches("()").to_ascii_lowercase();
        match name.as_str() {
            "uniformsky" | "uniform_sky" | "uniform" => Ok(DistKind::UniformSky),
            "fishersky" | "fisher_sky" | "fisher" => Ok(DistKind::Fisher),
            _ => Err(UnknownDistribution(s.to_string())),
        }
    }
}

/// A 2-D probability distribution over sky position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkyDistribution {
    /// Uniform over the whole celestial sphere.
    UniformSky,
    /// Fisher (von Mises) distribution about `center` with angular width
    /// `sigma`; `cos_cutoff` truncates the polar angle for coverage
    /// restriction (-1 means untruncated).
    Fisher {
        center: SkyPoint,
        sigma: f64,
        cos_cutoff: f64,
    },
    /// Uniform over the spherical cap of the given angular `radius`.
    UniformDisk { center: SkyPoint, radius: f64 },
}

impl SkyDistribution {
    pub fn fisher(center: SkyPoint, sigma: f64) -> Self {
        SkyDistribution::Fisher {
            center,
            sigma,
            cos_cutoff: -1.0,
        }
    }

    pub fn uniform_disk(center: SkyPoint, radius: f64) -> Self {
        SkyDistribution::UniformDisk { center, radius }
    }

    /// Maximum-probability point, if the distribution has one.
    pub fn mode(&self) -> Option<SkyPoint> {
        match self {
            SkyDistribution::UniformSky => None,
            SkyDistribution::Fisher { center, .. } => Some(*center),
            SkyDistribution::UniformDisk { center, .. } => Some(*center),
        }
    }

    /// Draw one sky position.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> SkyPoint {
        match self {
            SkyDistribution::UniformSky => {
                // Uniform z plus uniform azimuth is uniform on the sphere.
                let z: f64 = rng.gen_range(-1.0..1.0);
                SkyPoint::new(rng.gen_range(0.0..TAU), z.asin())
            }
            SkyDistribution::Fisher {
                center,
                sigma,
                cos_cutoff,
            } => {
                let kappa = 1.0 / (sigma * sigma);
                // Inverse CDF of the truncated w = cos(theta) marginal,
                // exponentially tilted with concentration kappa. The floor
                // term underflows to zero for large kappa, which is exact
                // enough: the cutoff is then many sigma out.
                let floor = (kappa * (cos_cutoff - 1.0)).exp();
                let u: f64 = rng.gen();
                let w = (1.0 + (floor + u * (1.0 - floor)).ln() / kappa).clamp(-1.0, 1.0);
                polar_about(center, w, rng.gen_range(0.0..TAU))
            }
            SkyDistribution::UniformDisk { center, radius } => {
                // Uniform in cap area: w = cos(theta) uniform on [cos r, 1].
                let u: f64 = rng.gen();
                let w = 1.0 - u * (1.0 - radius.cos());
                polar_about(center, w, rng.gen_range(0.0..TAU))
            }
        }
    }

    /// Restrict the distribution to the region enclosing `fraction` of its
    /// probability mass. Uniform-sky is unaffected.
    pub fn shrink_to_coverage(self, fraction: f64) -> Self {
        match self {
            SkyDistribution::UniformSky => self,
            SkyDistribution::Fisher { center, sigma, .. } => {
                let kappa = 1.0 / (sigma * sigma);
                // Radial CDF of the Fisher distribution, solved for the
                // angle enclosing the requested mass.
                let tail = (-2.0 * kappa).exp();
                let cos_cutoff = (1.0 + (1.0 - fraction * (1.0 - tail)).ln() / kappa).clamp(-1.0, 1.0);
                SkyDistribution::Fisher {
                    center,
                    sigma,
                    cos_cutoff,
                }
            }
            SkyDistribution::UniformDisk { center, radius } => {
                let w = 1.0 - fraction * (1.0 - radius.cos());
                SkyDistribution::UniformDisk {
                    center,
                    radius: w.clamp(-1.0, 1.0).acos(),
                }
            }
        }
    }
}

/// Point at polar coordinates (w = cos(theta), phi) in the tangent frame
/// about `center`.
fn polar_about(center: &SkyPoint, w: f64, phi: f64) -> SkyPoint {
    let c = center.unit_vector();
    let (e1, e2) = c.any_orthonormal_pair();
    let s = (1.0 - w * w).max(0.0).sqrt();
    SkyPoint::from_unit_vector(w * c + s * (phi.cos() * e1 + phi.sin() * e2))
}
