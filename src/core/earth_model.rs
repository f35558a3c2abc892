//! Distances, azimuths and frame conversions on a WGS84 or spherical Earth.

use crate::core::coordinates::{EcefCoordinate, EnuCoordinate, GeodeticCoordinate, NezCoordinate};
use crate::core::geodesic::{Geodesic, GeodesicLine, WGS84_A, WGS84_F};
use ndarray::{arr1, array, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const A: f64 = WGS84_A;
const F: f64 = WGS84_F;
const B: f64 = A * (1.0 - F);
/// First eccentricity squared
const E2: f64 = 1.0 - B * B / (A * A);
/// Second eccentricity squared
const EP2: f64 = F * (2.0 - F) / ((1.0 - F) * (1.0 - F));

const POLAR_RADIUS_M: f64 = 6356752.314;
const IASPEI_RADIUS_M: f64 = 6371000.0;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;
const MINUTES_PER_DEGREE: f64 = 60.0;
/// Pole tolerance (radians) for great-circle azimuths
const POLE_EPSILON: f64 = 1.7453e-8;

/// Kilometres per degree of arc on the IASPEI mean-radius sphere
pub const KM_PER_DEGREE: f64 = PI / 180.0 * (IASPEI_RADIUS_M / 1000.0);

/// Inverse-problem summary between two points, azimuths in [0, 360)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodesicResult {
    /// Ellipsoidal distance in metres
    pub distance_m: f64,
    /// Azimuth from the first point to the second
    pub azimuth: f64,
    /// Azimuth from the second point back to the first
    pub back_azimuth: f64,
    /// Arc distance in degrees
    pub arc_degrees: f64,
}

/// Map an azimuth in (-180, 180] into [0, 360)
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let az = if azimuth >= 0.0 { azimuth } else { 360.0 + azimuth };
    if az >= 360.0 {
        az - 360.0
    } else {
        az
    }
}

/// Solve the WGS84 inverse problem between two positions
pub fn inverse(from: &GeodeticCoordinate, to: &GeodeticCoordinate) -> GeodesicResult {
    let g = Geodesic::wgs84().inverse(from.lat, from.lon, to.lat, to.lon);
    GeodesicResult {
        distance_m: g.s12,
        azimuth: normalize_azimuth(g.azi1),
        back_azimuth: normalize_azimuth(g.azi2 + 180.0),
        arc_degrees: g.a12,
    }
}

/// Ellipsoidal distance in km
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic::wgs84().inverse(lat1, lon1, lat2, lon2).s12 / 1000.0
}

/// Arc distance in degrees
pub fn delta(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Geodesic::wgs84().inverse(lat1, lon1, lat2, lon2).a12
}

/// Same as [`delta`]
pub fn distance_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    delta(lat1, lon1, lat2, lon2)
}

/// Azimuth from point 1 to point 2, degrees clockwise from north in [0, 360)
pub fn azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    normalize_azimuth(Geodesic::wgs84().inverse(lat1, lon1, lat2, lon2).azi1)
}

/// Event-to-station azimuth
pub fn esaz(evla: f64, evlo: f64, stla: f64, stlo: f64) -> f64 {
    azimuth(evla, evlo, stla, stlo)
}

/// Station-to-event azimuth (back azimuth)
pub fn seaz(evla: f64, evlo: f64, stla: f64, stlo: f64) -> f64 {
    azimuth(stla, stlo, evla, evlo)
}

/// Back azimuth seen at a station for an event
pub fn back_azimuth(stla: f64, stlo: f64, evla: f64, evlo: f64) -> f64 {
    azimuth(stla, stlo, evla, evlo)
}

/// Largest angular gap between consecutive azimuths, including the wrap from the last back to the first.
///
/// Returns -1 for an empty set.
pub fn az_gap_from_azimuths(azimuths: &[f64]) -> f64 {
    if azimuths.is_empty() {
        return -1.0;
    }
    let mut sorted = azimuths.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut max_gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0_f64, f64::max);
    let wrap = sorted[0] + 360.0 - sorted[sorted.len() - 1];
    if wrap > max_gap {
        max_gap = wrap;
    }
    max_gap
}

/// Azimuthal gap of an event given station positions; -1 for empty or mismatched inputs
pub fn azimuthal_gap(evla: f64, evlo: f64, stla: &[f64], stlo: &[f64]) -> f64 {
    if stla.is_empty() || stla.len() != stlo.len() {
        return -1.0;
    }
    let azimuths: Vec<f64> = stla
        .iter()
        .zip(stlo)
        .map(|(&lat, &lon)| esaz(evla, evlo, lat, lon))
        .collect();
    az_gap_from_azimuths(&azimuths)
}

/// Angle in degrees between two azimuths
pub fn angle_between_azimuths(azimuth1: f64, azimuth2: f64) -> f64 {
    let theta1 = (90.0 - azimuth1).to_radians();
    let theta2 = (90.0 - azimuth2).to_radians();
    let dot = theta1.cos() * theta2.cos() + theta1.sin() * theta2.sin();
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Spherical great-circle distance in degrees
pub fn great_circle_delta(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, l1, p2, l2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let cos_d = p1.cos() * p2.cos() * (l1 - l2).cos() + p1.sin() * p2.sin();
    cos_d.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Spherical azimuth from point 1 to point 2 in [0, 360), handling either point at a pole
pub fn great_circle_azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (p1, l1, p2, l2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let half_pi = PI / 2.0;
    if p1 >= half_pi - POLE_EPSILON {
        180.0
    } else if p1 <= POLE_EPSILON - half_pi {
        0.0
    } else if p2 >= half_pi - POLE_EPSILON {
        0.0
    } else if p2 <= POLE_EPSILON - half_pi {
        180.0
    } else {
        let dlon = l2 - l1;
        let term1 = dlon.sin() * p2.cos();
        let term2 = p1.cos() * p2.sin();
        let term3 = p1.sin() * p2.cos() * dlon.cos();
        let result = term1.atan2(term2 - term3).to_degrees();
        if result >= 0.0 {
            result
        } else {
            result + 360.0
        }
    }
}

/// Destination on a sphere after travelling `delta` degrees along `azimuth`
pub fn reckon(lat: f64, lon: f64, delta: f64, azimuth: f64) -> GeodeticCoordinate {
    let (lat_r, lon_r) = (lat.to_radians(), lon.to_radians());
    let (sin_az, cos_az) = azimuth.to_radians().sin_cos();
    let (sinc, cosc) = delta.to_radians().sin_cos();
    let (sinlat, coslat) = lat_r.sin_cos();

    let new_lat = (sinlat * cosc + coslat * sinc * cos_az).asin().to_degrees();
    let mut new_lon = ((sinc * sin_az).atan2(coslat * cosc - sinlat * sinc * cos_az) + lon_r).to_degrees();
    if new_lon > 180.0 {
        new_lon -= 360.0;
    }
    if new_lon < -180.0 {
        new_lon += 360.0;
    }
    GeodeticCoordinate::surface(new_lat, new_lon)
}

/// Destination on the WGS84 ellipsoid after an arc of `delta` degrees along `azimuth`
pub fn reckon_wgs84(lat: f64, lon: f64, delta: f64, azimuth: f64) -> GeodeticCoordinate {
    let line = GeodesicLine::new(Geodesic::wgs84(), lat, lon, azimuth);
    let p = line.arc_position(delta);
    GeodeticCoordinate::surface(p.lat2, p.lon2)
}

/// Vertices of a small circle of `radius` degrees around `center`.
///
/// `npts` is raised to at least 4 and the radius capped at 90 degrees. The result
/// holds `npts + 1` vertices, the last repeating the first so the ring is closed.
pub fn small_circle(center: &GeodeticCoordinate, radius: f64, npts: usize) -> Vec<GeodeticCoordinate> {
    let npts = npts.max(4);
    let radius = radius.min(90.0);
    let dtheta = 360.0 / npts as f64;
    (0..=npts)
        .map(|j| reckon(center.lat, center.lon, radius, j as f64 * dtheta))
        .collect()
}

/// `npts + 1` evenly spaced points along the WGS84 geodesic from start to end (at least 3 segments)
pub fn track(start_lat: f64, start_lon: f64, end_lat: f64, end_lon: f64, npts: usize) -> Vec<GeodeticCoordinate> {
    let npts = npts.max(3);
    let line = Geodesic::wgs84().inverse_line(start_lat, start_lon, end_lat, end_lon);
    let ds = line.distance() / npts as f64;
    (0..=npts)
        .map(|i| {
            let p = line.position(i as f64 * ds);
            GeodeticCoordinate::surface(p.lat2, p.lon2)
        })
        .collect()
}

/// WGS84 radius in km at a geodetic latitude
pub fn earth_radius(latitude: f64) -> f64 {
    let theta = (90.0 - latitude).to_radians();
    let t1 = POLAR_RADIUS_M * theta.cos();
    let t2 = A * theta.sin();
    (t1 * t1 + t2 * t2).sqrt() / 1000.0
}

/// Radius in km of the point at `depth_km` below the ellipsoid at `latitude`
pub fn local_radius(latitude: f64, depth_km: f64) -> f64 {
    let lat = latitude.to_radians();
    let r1 = lat.sin() * A;
    let r2 = lat.cos() * POLAR_RADIUS_M;
    A * POLAR_RADIUS_M / (r1 * r1 + r2 * r2).sqrt() / 1000.0 - depth_km
}

pub fn wgs84_radius_km() -> f64 {
    A / 1000.0
}

pub fn km_per_degree() -> f64 {
    KM_PER_DEGREE
}

pub fn degrees_per_km() -> f64 {
    1.0 / KM_PER_DEGREE
}

pub fn degrees_to_km(degrees: f64) -> f64 {
    degrees * KM_PER_DEGREE
}

pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}

/// Change in longitude (degrees) for an east-west departure at `lat`
pub fn degrees_from_departure(lat: f64, departure_km: f64) -> f64 {
    (departure_km / (KM_PER_NAUTICAL_MILE * MINUTES_PER_DEGREE * lat.to_radians().cos())).abs()
}

/// East-west departure in km for a change in longitude at `lat`
pub fn departure_km(lat: f64, delta: f64) -> f64 {
    (delta * KM_PER_NAUTICAL_MILE * MINUTES_PER_DEGREE * lat.to_radians().cos()).abs()
}

/// Geocentric latitude of a point at `height_m` above the ellipsoid
pub fn geodetic_to_geocentric_lat(lat: f64, height_m: f64) -> f64 {
    let phi = lat.to_radians();
    let sin_phi = phi.sin();
    let n = A / (1.0 - E2 * sin_phi * sin_phi).sqrt();
    let tan_phi_p = n * (1.0 - F) * (1.0 - F) / (n + height_m) * phi.tan();
    tan_phi_p.atan().to_degrees()
}

pub fn geodetic_to_ecef(coord: &GeodeticCoordinate) -> EcefCoordinate {
    let h = -coord.depth_km * 1000.0;
    let phi = coord.lat.to_radians();
    let lambda = coord.lon.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let n = A / (1.0 - E2 * sin_phi * sin_phi).sqrt();
    EcefCoordinate::new(
        (n + h) * cos_phi * lambda.cos(),
        (n + h) * cos_phi * lambda.sin(),
        (n * (1.0 - E2) + h) * sin_phi,
    )
}

/// Closed-form ECEF to geodetic conversion (no iteration)
pub fn ecef_to_geodetic(coord: &EcefCoordinate) -> GeodeticCoordinate {
    let (x, y, z) = (coord.x, coord.y, coord.z);
    let r = (x * x + y * y).sqrt();
    let big_e2 = A * A - B * B;
    let f = 54.0 * B * B * z * z;
    let g = r * r + (1.0 - E2) * z * z - E2 * big_e2;
    let c = E2 * E2 * f * r * r / (g * g * g);
    let s = (1.0 + c + (c * c + 2.0 * c).sqrt()).cbrt();
    let k = s + 1.0 / s + 1.0;
    let p = f / (3.0 * k * k * g * g);
    let q = (1.0 + 2.0 * E2 * E2 * p).sqrt();
    let r01 = -p * E2 * r / (1.0 + q);
    let r02 = A * A * (1.0 + 1.0 / q) / 2.0;
    let r03 = p * (1.0 - E2) * z * z / q / (1.0 + q);
    let r04 = p * r * r / 2.0;
    let r0 = r01 + (r02 - r03 - r04).sqrt();
    let u1 = r - E2 * r0;
    let u = (u1 * u1 + z * z).sqrt();
    let v = (u1 * u1 + (1.0 - E2) * z * z).sqrt();
    let z0 = B * B * z / (A * v);
    let h = u * (1.0 - B * B / (A * v));
    let phi = ((z + EP2 * z0) / r).atan();
    let lambda = y.atan2(x);
    GeodeticCoordinate::new(phi.to_degrees(), lambda.to_degrees(), -h / 1000.0)
}

/// ECEF → ENU rotation at a reference latitude/longitude
fn enu_rotation(reference: &GeodeticCoordinate) -> Array2<f64> {
    let (sinl, cosl) = reference.lon.to_radians().sin_cos();
    let (sinp, cosp) = reference.lat.to_radians().sin_cos();
    array![
        [-sinl, cosl, 0.0],
        [-sinp * cosl, -sinp * sinl, cosp],
        [cosp * cosl, cosp * sinl, sinp],
    ]
}

pub fn ecef_to_enu(reference: &GeodeticCoordinate, pos: &EcefCoordinate) -> EnuCoordinate {
    let origin = geodetic_to_ecef(reference);
    let dif = arr1(&[pos.x - origin.x, pos.y - origin.y, pos.z - origin.z]);
    let v = enu_rotation(reference).dot(&dif);
    EnuCoordinate::new(v[0], v[1], v[2])
}

pub fn enu_to_ecef(enu: &EnuCoordinate, reference: &GeodeticCoordinate) -> EcefCoordinate {
    let local = arr1(&[enu.east_m, enu.north_m, enu.up_m]);
    let v = enu_rotation(reference).t().dot(&local);
    let origin = geodetic_to_ecef(reference);
    EcefCoordinate::new(v[0] + origin.x, v[1] + origin.y, v[2] + origin.z)
}

pub fn geodetic_to_enu(reference: &GeodeticCoordinate, pos: &GeodeticCoordinate) -> EnuCoordinate {
    ecef_to_enu(reference, &geodetic_to_ecef(pos))
}

pub fn enu_to_geodetic(reference: &GeodeticCoordinate, pos: &EnuCoordinate) -> GeodeticCoordinate {
    ecef_to_geodetic(&enu_to_ecef(pos, reference))
}

pub fn enu_to_nez(enu: &EnuCoordinate) -> NezCoordinate {
    NezCoordinate::new(enu.north_m / 1000.0, enu.east_m / 1000.0, -enu.up_m / 1000.0)
}

pub fn nez_to_enu(nez: &NezCoordinate) -> EnuCoordinate {
    EnuCoordinate::new(nez.east_km * 1000.0, nez.north_km * 1000.0, -nez.down_km * 1000.0)
}

/// Position relative to `origin` in the local north-east-down frame
pub fn local_coords(origin: &GeodeticCoordinate, position: &GeodeticCoordinate) -> NezCoordinate {
    enu_to_nez(&geodetic_to_enu(origin, position))
}

/// Local coordinates for many positions at once
pub fn local_coords_batch(origin: &GeodeticCoordinate, positions: &[GeodeticCoordinate]) -> Vec<NezCoordinate> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        positions.par_iter().map(|p| local_coords(origin, p)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        positions.iter().map(|p| local_coords(origin, p)).collect()
    }
}

/// Geodetic position of a local north-east-down offset from `origin`
pub fn geodetic_coords(origin: &GeodeticCoordinate, local: &NezCoordinate) -> GeodeticCoordinate {
    enu_to_geodetic(origin, &nez_to_enu(local))
}

/// Straight-line separation in metres through the Earth
pub fn separation_meters(c1: &GeodeticCoordinate, c2: &GeodeticCoordinate) -> f64 {
    geodetic_to_ecef(c1).separation_meters(&geodetic_to_ecef(c2))
}

/// Plane-wave delay (s) between an array reference element and an observing element.
///
/// `apparent_velocity` is in km/s; a negative delay means the wavefront reaches the
/// observing element first.
pub fn delay(
    source: &GeodeticCoordinate,
    reference: &GeodeticCoordinate,
    observation: &GeodeticCoordinate,
    apparent_velocity: f64,
) -> f64 {
    let local = local_coords(reference, observation);
    let baz = back_azimuth(reference.lat, reference.lon, source.lat, source.lon);
    let az = (baz - 180.0).to_radians();
    let sx = az.cos() / apparent_velocity;
    let sy = az.sin() / apparent_velocity;
    sx * local.north_km + sy * local.east_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geodetic_ecef_axes() {
        let p = geodetic_to_ecef(&GeodeticCoordinate::new(0.0, 0.0, 0.0));
        assert!((p.x - A).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);

        let pole = geodetic_to_ecef(&GeodeticCoordinate::new(90.0, 0.0, 0.0));
        assert!(pole.x.abs() < 1e-6);
        assert!((pole.z - B).abs() < 1e-6);
    }

    #[test]
    fn test_geodetic_round_trip() {
        let points = [
            GeodeticCoordinate::new(0.0, 0.0, 0.0),
            GeodeticCoordinate::new(45.0, -120.0, 10.0),
            GeodeticCoordinate::new(-33.5, 151.2, -2.5),
            GeodeticCoordinate::new(89.5, 179.9, 600.0),
            GeodeticCoordinate::new(-72.25, -45.0, 35.0),
        ];
        for g in &points {
            let back = ecef_to_geodetic(&geodetic_to_ecef(g));
            assert!((back.lat - g.lat).abs() < 1e-6, "{} vs {}", back, g);
            assert!((back.lon - g.lon).abs() < 1e-6, "{} vs {}", back, g);
            assert!((back.depth_km - g.depth_km).abs() < 1e-6, "{} vs {}", back, g);
        }
    }

    #[test]
    fn test_enu_round_trip_and_nez() {
        let reference = GeodeticCoordinate::new(40.0, -105.0, 0.0);
        let target = GeodeticCoordinate::new(40.01, -104.99, 1.0);

        let enu = geodetic_to_enu(&reference, &target);
        assert!(enu.north_m > 1000.0 && enu.east_m > 700.0);
        assert!(enu.up_m < -999.0);

        let nez = enu_to_nez(&enu);
        assert!((nez.north_km - enu.north_m / 1000.0).abs() < 1e-12);
        assert!((nez.down_km + enu.up_m / 1000.0).abs() < 1e-12);
        let enu_back = nez_to_enu(&nez);
        assert!((enu_back.east_m - enu.east_m).abs() < 1e-9);
        assert!((enu_back.up_m - enu.up_m).abs() < 1e-9);

        let back = geodetic_coords(&reference, &nez);
        assert!((back.lat - target.lat).abs() < 1e-7);
        assert!((back.lon - target.lon).abs() < 1e-7);
        assert!((back.depth_km - target.depth_km).abs() < 1e-6);
    }

    #[test]
    fn test_local_coords_batch_matches_single() {
        let origin = GeodeticCoordinate::surface(10.0, 10.0);
        let positions: Vec<_> = (0..20)
            .map(|i| GeodeticCoordinate::surface(10.0 + i as f64 * 0.01, 10.0))
            .collect();
        let batch = local_coords_batch(&origin, &positions);
        assert_eq!(batch.len(), 20);
        assert_eq!(batch[7], local_coords(&origin, &positions[7]));
    }

    #[test]
    fn test_azimuthal_gap_example() {
        assert!((az_gap_from_azimuths(&[10.0, 90.0, 200.0]) - 170.0).abs() < 1e-12);
        assert!((az_gap_from_azimuths(&[200.0, 10.0, 90.0]) - 170.0).abs() < 1e-12);
        assert_eq!(az_gap_from_azimuths(&[]), -1.0);
    }

    #[test]
    fn test_azimuthal_gap_from_positions() {
        // stations due north, east, south and west
        let stla = [1.0, 0.0, -1.0, 0.0];
        let stlo = [0.0, 1.0, 0.0, -1.0];
        let gap = azimuthal_gap(0.0, 0.0, &stla, &stlo);
        assert!((gap - 90.0).abs() < 1e-6);

        assert_eq!(azimuthal_gap(0.0, 0.0, &[], &[]), -1.0);
        assert_eq!(azimuthal_gap(0.0, 0.0, &[1.0], &[1.0, 2.0]), -1.0);
    }

    #[test]
    fn test_azimuths_are_normalised() {
        let az = azimuth(0.0, 0.0, 0.0, -1.0);
        assert!((az - 270.0).abs() < 1e-9);
        let baz = back_azimuth(0.0, -1.0, 0.0, 0.0);
        assert!((baz - 90.0).abs() < 1e-9);
        assert!((esaz(0.0, 0.0, 1.0, 0.0)).abs() < 1e-9);
        assert!((seaz(0.0, 0.0, 1.0, 0.0) - 180.0).abs() < 1e-9);
        assert_eq!(normalize_azimuth(-90.0), 270.0);
    }

    #[test]
    fn test_great_circle() {
        assert!((great_circle_delta(0.0, 0.0, 0.0, 90.0) - 90.0).abs() < 1e-9);
        assert!((great_circle_azimuth(0.0, 0.0, 0.0, 90.0) - 90.0).abs() < 1e-9);
        assert_eq!(great_circle_azimuth(90.0, 0.0, 10.0, 10.0), 180.0);
        assert_eq!(great_circle_azimuth(10.0, 0.0, -90.0, 10.0), 180.0);
    }

    #[test]
    fn test_reckon() {
        let p = reckon(0.0, 0.0, 90.0, 90.0);
        assert!(p.lat.abs() < 1e-9);
        assert!((p.lon - 90.0).abs() < 1e-9);

        let wrapped = reckon(0.0, 170.0, 20.0, 90.0);
        assert!((wrapped.lon + 170.0).abs() < 1e-9);

        let q = reckon_wgs84(0.0, 0.0, 1.0, 0.0);
        assert!(q.lat > 0.99 && q.lat < 1.01);
        assert!(q.lon.abs() < 1e-9);
    }

    #[test]
    fn test_small_circle_is_closed() {
        let center = GeodeticCoordinate::surface(30.0, 60.0);
        let ring = small_circle(&center, 5.0, 8);
        assert_eq!(ring.len(), 9);
        assert!((ring[0].lat - ring[8].lat).abs() < 1e-9);
        assert!((ring[0].lon - ring[8].lon).abs() < 1e-9);
        for v in &ring {
            assert!((great_circle_delta(30.0, 60.0, v.lat, v.lon) - 5.0).abs() < 1e-6);
        }
        assert_eq!(small_circle(&center, 200.0, 2).len(), 5);
    }

    #[test]
    fn test_track_endpoints() {
        let points = track(10.0, 20.0, 30.0, 40.0, 4);
        assert_eq!(points.len(), 5);
        assert!((points[0].lat - 10.0).abs() < 1e-9);
        assert!((points[4].lat - 30.0).abs() < 1e-7);
        assert!((points[4].lon - 40.0).abs() < 1e-7);
        assert_eq!(track(0.0, 0.0, 1.0, 1.0, 1).len(), 4);
    }

    #[test]
    fn test_radius_helpers() {
        assert!((earth_radius(0.0) - 6378.137).abs() < 1e-6);
        assert!((earth_radius(90.0) - 6356.752314).abs() < 1e-6);
        assert!((local_radius(0.0, 10.0) - (6378.137 - 10.0)).abs() < 1e-6);
        assert!((km_per_degree() - 111.19492664).abs() < 1e-6);
        assert!((degrees_per_km() * km_per_degree() - 1.0).abs() < 1e-12);
        assert!((km_to_degrees(degrees_to_km(2.5)) - 2.5).abs() < 1e-12);
        assert!((departure_km(0.0, 1.0) - 111.12).abs() < 1e-9);
        assert!((degrees_from_departure(0.0, 111.12) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_separation_and_delay() {
        let a = GeodeticCoordinate::new(0.0, 0.0, 0.0);
        let b = GeodeticCoordinate::new(0.0, 0.0, 1.0);
        assert!((separation_meters(&a, &b) - 1000.0).abs() < 1e-6);

        let reference = GeodeticCoordinate::surface(45.0, 10.0);
        let north = geodetic_coords(&reference, &NezCoordinate::new(1.0, 0.0, 0.0));
        let source = GeodeticCoordinate::surface(60.0, 10.0);
        let dt = delay(&source, &reference, &north, 8.0);
        assert!((dt + 1.0 / 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_geocentric_latitude() {
        assert!(geodetic_to_geocentric_lat(0.0, 0.0).abs() < 1e-12);
        let gc = geodetic_to_geocentric_lat(45.0, 0.0);
        assert!((gc - 44.8076).abs() < 1e-3);
    }
}
