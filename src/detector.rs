//! Ground-based detector geometry: vertex locations, baselines, and
//! arrival-time delays.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sky::SkyPoint;

/// Speed of light, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// GPS epoch (1980-01-06 00:00:00 UTC) as a Julian date.
const GPS_EPOCH_JD: f64 = 2_444_244.5;

/// GPS − UTC offset in seconds (constant since 2017-01-01).
const GPS_LEAP_SECONDS: f64 = 18.0;

/// A ground-based gravitational-wave interferometer.
///
/// Variants are declared in alphabetical order so the derived `Ord` matches
/// the alphabetical pair enumeration the grid builder relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Detector {
    /// GEO600, Hannover.
    G1,
    /// LIGO Hanford.
    H1,
    /// KAGRA, Kamioka.
    K1,
    /// LIGO Livingston.
    L1,
    /// Virgo, Cascina.
    V1,
}

#[derive(Debug, Error)]
#[error("unknown detector \"{0}\" (expected one of G1, H1, K1, L1, V1)")]
pub struct UnknownDetector(String);

impl Detector {
    pub const ALL: [Detector; 5] = [
        Detector::G1,
        Detector::H1,
        Detector::K1,
        Detector::L1,
        Detector::V1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Detector::G1 => "G1",
            Detector::H1 => "H1",
            Detector::K1 => "K1",
            Detector::L1 => "L1",
            Detector::V1 => "V1",
        }
    }

    /// Earth-fixed vertex coordinates in meters (standard published values).
    pub fn vertex(&self) -> DVec3 {
        match self {
            Detector::G1 => DVec3::new(3_856_309.949_26, 666_598.956_317, 5_019_641.417_25),
            Detector::H1 => DVec3::new(-2_161_414.926_36, -3_834_695.178_89, 4_600_350.226_64),
            Detector::K1 => DVec3::new(-3_777_336.024, 3_484_898.411, 3_765_313.697),
            Detector::L1 => DVec3::new(-74_276.044_723_8, -5_496_283.719_71, 3_224_257.017_44),
            Detector::V1 => DVec3::new(4_546_374.099, 842_989.697_626, 4_378_576.962_41),
        }
    }

    /// Time for light to travel the baseline to `other`, in seconds.
    pub fn light_travel_time(&self, other: Detector) -> f64 {
        (self.vertex() - other.vertex()).length() / SPEED_OF_LIGHT
    }

    /// Geometric arrival-time difference (`other` minus `self`, seconds) for
    /// a signal from `point` arriving at GPS time `gps_time`.
    pub fn time_delay(&self, other: Detector, point: &SkyPoint, gps_time: f64) -> f64 {
        let gha = gmst_from_gps(gps_time) - point.ra;
        let (sin_gha, cos_gha) = gha.sin_cos();
        let (sin_dec, cos_dec) = point.dec.sin_cos();
        // Source direction in the Earth-fixed frame.
        let ehat = DVec3::new(cos_dec * cos_gha, -cos_dec * sin_gha, sin_dec);
        (other.vertex() - self.vertex()).dot(ehat) / SPEED_OF_LIGHT
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Detector {
    type Err = UnknownDetector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Detector::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDetector(s.to_string()))
    }
}

/// All unordered detector pairs, enumerated alphabetically.
///
/// The caller is expected to pass a sorted, duplicate-free slice; the output
/// order is then deterministic across runs.
pub fn detector_pairs(instruments: &[Detector]) -> Vec<(Detector, Detector)> {
    let n = instruments.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, &a) in instruments.iter().enumerate() {
        for &b in &instruments[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Greenwich Mean Sidereal Time at a GPS time, in radians.
///
/// IAU 1982 polynomial with a fixed GPS−UTC leap-second offset; UT1 is
/// approximated by UTC, which is far below the timing precision that matters
/// for grid spacing.
pub fn gmst_from_gps(gps_time: f64) -> f64 {
    let jd = GPS_EPOCH_JD + (gps_time - GPS_LEAP_SECONDS) / 86_400.0;
    let t = (jd - 2_451_545.0) / 36_525.0;
    let gmst_seconds = 67_310.548_41
        + (876_600.0 * 3_600.0 + 8_640_184.812_866) * t
        + 0.093_104 * t * t
        - 6.2e-6 * t * t * t;
    (gmst_seconds.rem_euclid(86_400.0) / 86_400.0) * std::f64::consts::TAU
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn test_parse_round_trip() {
        for d in Detector::ALL {
            assert_eq!(d.name().parse::<Detector>().unwrap(), d);
            assert_eq!(d.name().to_lowercase().parse::<Detector>().unwrap(), d);
        }
        assert!("X9".parse::<Detector>().is_err());
    }

    #[test]
    fn test_hanford_livingston_baseline() {
        // The H1-L1 baseline is very close to 10 light-milliseconds.
        let t = Detector::H1.light_travel_time(Detector::L1);
        assert!((t - 0.010).abs() < 5e-4, "unexpected baseline: {} s", t);
        assert_eq!(t, Detector::L1.light_travel_time(Detector::H1));
    }

    #[test]
    fn test_delay_bounded_by_light_travel_time() {
        let t = Detector::H1.light_travel_time(Detector::V1);
        for i in 0..50 {
            let ra = TAU * (i as f64) / 50.0;
            let dec = -1.2 + 2.4 * (i as f64) / 50.0;
            let p = SkyPoint::new(ra, dec);
            let d = Detector::H1.time_delay(Detector::V1, &p, 1_000_000_000.0);
            assert!(d.abs() <= t + 1e-12, "delay {} exceeds baseline {}", d, t);
        }
    }

    #[test]
    fn test_gmst_advances_by_sidereal_day() {
        let t0 = 1_126_259_462.0;
        let g0 = gmst_from_gps(t0);
        assert!((0.0..TAU).contains(&g0));

        // One mean sidereal day later the angle comes back around.
        let g1 = gmst_from_gps(t0 + 86_164.090_5);
        let wrapped = (g1 - g0 + TAU / 2.0).rem_euclid(TAU) - TAU / 2.0;
        assert!(wrapped.abs() < 1e-4, "gmst drifted by {} rad", wrapped);
    }

    #[test]
    fn test_pair_enumeration() {
        let pairs = detector_pairs(&[Detector::H1, Detector::L1, Detector::V1]);
        assert_eq!(
            pairs,
            vec![
                (Detector::H1, Detector::L1),
                (Detector::H1, Detector::V1),
                (Detector::L1, Detector::V1),
            ]
        );
    }
}
