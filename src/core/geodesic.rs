//! Ellipsoidal geodesic solver.
//!
//! Inverse and direct problems are solved with Karney's algorithm, which
//! converges for every pair of points including nearly antipodal ones.
//! Conversions between distance and auxiliary-sphere arc use Vincenty's series.

use geographiclib_rs::{DirectGeodesic, Geodesic as Karney, InverseGeodesic};
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in metres
pub const WGS84_A: f64 = 6378137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

/// Solution of a geodesic problem; angles in degrees, distance in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodesicData {
    pub lat1: f64,
    pub lon1: f64,
    pub lat2: f64,
    pub lon2: f64,
    /// Forward azimuth at point 1, in [-180, 180]
    pub azi1: f64,
    /// Forward azimuth at point 2, in [-180, 180]
    pub azi2: f64,
    /// Ellipsoidal distance in metres
    pub s12: f64,
    /// Arc length on the auxiliary sphere in degrees
    pub a12: f64,
}

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geodesic {
    a: f64,
    f: f64,
    b: f64,
}

impl Default for Geodesic {
    fn default() -> Self {
        Self::wgs84()
    }
}

/// Wrap an angle in degrees into [-180, 180)
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && angle > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Vincenty's series coefficients A and B for a given u²
fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sm: f64) -> f64 {
    big_b
        * sin_sigma
        * (cos_2sm
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)
                    - big_b / 6.0
                        * cos_2sm
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sm * cos_2sm)))
}

/// Distance/arc relation along the geodesic leaving a point at a given azimuth
struct AuxiliaryArc {
    sigma1: f64,
    scale: f64,
    big_b: f64,
}

impl AuxiliaryArc {
    fn new(geodesic: &Geodesic, lat1: f64, azi1: f64) -> Self {
        let (a, b, f) = (geodesic.a, geodesic.b, geodesic.f);
        let (sin_a1, cos_a1) = azi1.to_radians().sin_cos();
        let tan_u1 = (1.0 - f) * lat1.to_radians().tan();
        let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
        let sin_alpha = cos_u1 * sin_a1;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let (big_a, big_b) = series_coefficients(u_sq);
        Self {
            sigma1: tan_u1.atan2(cos_a1),
            scale: b * big_a,
            big_b,
        }
    }

    fn correction(&self, sigma: f64) -> f64 {
        let cos_2sm = (2.0 * self.sigma1 + sigma).cos();
        delta_sigma(self.big_b, sigma.sin(), sigma.cos(), cos_2sm)
    }

    /// Distance in metres for an arc in radians
    fn distance(&self, sigma: f64) -> f64 {
        self.scale * (sigma - self.correction(sigma))
    }

    /// Arc in radians for a distance in metres
    fn arc(&self, s12: f64) -> f64 {
        let base = s12 / self.scale;
        let mut sigma = base;
        for _ in 0..MAX_ITERATIONS {
            let next = base + self.correction(sigma);
            let done = (next - sigma).abs() < CONVERGENCE;
            sigma = next;
            if done {
                break;
            }
        }
        sigma
    }
}

impl Geodesic {
    pub fn new(a: f64, f: f64) -> Self {
        Self {
            a,
            f,
            b: a * (1.0 - f),
        }
    }

    pub fn wgs84() -> Self {
        Self::new(WGS84_A, WGS84_F)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.a
    }

    pub fn flattening(&self) -> f64 {
        self.f
    }

    fn solver(&self) -> Karney {
        Karney::new(self.a, self.f)
    }

    /// Solve the inverse problem between two points
    pub fn inverse(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> GeodesicData {
        let (s12, azi1, azi2, a12): (f64, f64, f64, f64) = self.solver().inverse(lat1, lon1, lat2, lon2);
        GeodesicData {
            lat1,
            lon1,
            lat2,
            lon2,
            azi1,
            azi2,
            s12,
            a12,
        }
    }

    /// Solve the direct problem for a distance in metres
    pub fn direct(&self, lat1: f64, lon1: f64, azi1: f64, s12: f64) -> GeodesicData {
        let (lat2, lon2, azi2): (f64, f64, f64) = self.solver().direct(lat1, lon1, azi1, s12);
        let a12 = AuxiliaryArc::new(self, lat1, azi1).arc(s12).to_degrees();
        GeodesicData {
            lat1,
            lon1,
            lat2,
            lon2: wrap_degrees(lon2),
            azi1,
            azi2,
            s12,
            a12,
        }
    }

    /// Solve the direct problem for an arc length in degrees on the auxiliary sphere
    pub fn arc_direct(&self, lat1: f64, lon1: f64, azi1: f64, a12: f64) -> GeodesicData {
        let s12 = AuxiliaryArc::new(self, lat1, azi1).distance(a12.to_radians());
        GeodesicData {
            a12,
            ..self.direct(lat1, lon1, azi1, s12)
        }
    }

    /// Geodesic line through two points, parameterised by distance from the first
    pub fn inverse_line(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> GeodesicLine {
        let solution = self.inverse(lat1, lon1, lat2, lon2);
        GeodesicLine {
            geodesic: *self,
            lat1,
            lon1,
            azi1: solution.azi1,
            distance: solution.s12,
        }
    }
}

/// A geodesic anchored at a point with a fixed starting azimuth
#[derive(Debug, Clone, Copy)]
pub struct GeodesicLine {
    geodesic: Geodesic,
    lat1: f64,
    lon1: f64,
    azi1: f64,
    distance: f64,
}

impl GeodesicLine {
    pub fn new(geodesic: Geodesic, lat1: f64, lon1: f64, azi1: f64) -> Self {
        Self {
            geodesic,
            lat1,
            lon1,
            azi1,
            distance: f64::NAN,
        }
    }

    /// Distance to the end point for lines built by [`Geodesic::inverse_line`]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn position(&self, s12: f64) -> GeodesicData {
        self.geodesic.direct(self.lat1, self.lon1, self.azi1, s12)
    }

    pub fn arc_position(&self, a12: f64) -> GeodesicData {
        self.geodesic.arc_direct(self.lat1, self.lon1, self.azi1, a12)
    }
}
