//! Celestial-sphere geometry: sky positions and great-circle distances.

use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A direction on the celestial sphere, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    /// Right ascension, normalized into [0, 2π).
    pub ra: f64,
    /// Declination in [-π/2, π/2].
    pub dec: f64,
}

impl SkyPoint {
    /// The (0, 0) direction, used to seed grids with no localization.
    pub const ORIGIN: Self = Self { ra: 0.0, dec: 0.0 };

    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Unit vector in equatorial Cartesian coordinates.
    pub fn unit_vector(&self) -> DVec3 {
        let (sin_ra, cos_ra) = self.ra.sin_cos();
        let (sin_dec, cos_dec) = self.dec.sin_cos();
        DVec3::new(cos_dec * cos_ra, cos_dec * sin_ra, sin_dec)
    }

    /// Recover (ra, dec) from a unit vector, wrapping RA into [0, 2π).
    pub fn from_unit_vector(v: DVec3) -> Self {
        Self {
            ra: v.y.atan2(v.x).rem_euclid(TAU),
            dec: v.z.clamp(-1.0, 1.0).asin(),
        }
    }

    /// Great-circle distance to another point, in radians.
    pub fn angular_distance(&self, other: &SkyPoint) -> f64 {
        self.unit_vector()
            .dot(other.unit_vector())
            .clamp(-1.0, 1.0)
            .acos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_unit_vectors() {
        let v = SkyPoint::ORIGIN.unit_vector();
        assert!((v - DVec3::X).length() < 1e-12);

        let v = SkyPoint::new(FRAC_PI_2, 0.0).unit_vector();
        assert!((v - DVec3::Y).length() < 1e-12);

        let v = SkyPoint::new(0.0, FRAC_PI_2).unit_vector();
        assert!((v - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_round_trip_wraps_ra() {
        // atan2 yields negative angles in the western hemisphere; conversion
        // back must land in [0, 2π).
        let p = SkyPoint::new(5.5, -0.3);
        let q = SkyPoint::from_unit_vector(p.unit_vector());
        assert!((p.ra - q.ra).abs() < 1e-12);
        assert!((p.dec - q.dec).abs() < 1e-12);
        assert!(q.ra >= 0.0 && q.ra < TAU);
    }

    #[test]
    fn test_angular_distance() {
        let a = SkyPoint::ORIGIN;
        let b = SkyPoint::new(PI, 0.0);
        assert!((a.angular_distance(&b) - PI).abs() < 1e-12);

        let c = SkyPoint::new(0.0, FRAC_PI_2);
        assert!((a.angular_distance(&c) - FRAC_PI_2).abs() < 1e-12);

        // Identical points: the clamp keeps acos away from NaN.
        assert_eq!(a.angular_distance(&a), 0.0);
    }
}
