//! Spherical, polar and cartesian conversions.
//!
//! Angles are radians unless a function name says otherwise. Triples are
//! returned as `[f64; 3]` in the order named by the function.

/// WGS84 first eccentricity
const WGS84_ECCENTRICITY: f64 = 0.081819190842621;

/// `(theta, phi, radius)` → `[x, y, z]`, theta the azimuthal angle and phi the elevation
pub fn spherical_to_cartesian(theta: f64, phi: f64, radius: f64) -> [f64; 3] {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    [radius * cos_phi * cos_theta, radius * cos_phi * sin_theta, radius * sin_phi]
}

/// `[x, y, z]` → `[theta, phi, radius]`
pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> [f64; 3] {
    let horizontal = x.hypot(y);
    [y.atan2(x), z.atan2(horizontal), (x * x + y * y + z * z).sqrt()]
}

/// `[x, y, z]` → `[theta, rho, z]`
pub fn cartesian_to_polar(x: f64, y: f64, z: f64) -> [f64; 3] {
    [y.atan2(x), x.hypot(y), z]
}

/// `(theta, rho, z)` → `[x, y, z]`
pub fn polar_to_cartesian(theta: f64, rho: f64, z: f64) -> [f64; 3] {
    let (sin_theta, cos_theta) = theta.sin_cos();
    [rho * cos_theta, rho * sin_theta, z]
}

/// Longitude and latitude in degrees plus a radius → `[x, y, z]`
pub fn lon_lat_radius_to_xyz(longitude: f64, latitude: f64, radius: f64) -> [f64; 3] {
    spherical_to_cartesian(longitude.to_radians(), latitude.to_radians(), radius)
}

/// `[x, y, z]` → `[longitude, latitude, radius]` with angles in degrees
pub fn xyz_to_lon_lat_radius(x: f64, y: f64, z: f64) -> [f64; 3] {
    let [theta, phi, radius] = cartesian_to_spherical(x, y, z);
    [theta.to_degrees(), phi.to_degrees(), radius]
}

/// Geocentric latitude (degrees) of a point on the ellipsoid surface
pub fn geodetic_to_geocentric_latitude(geodetic_latitude: f64) -> f64 {
    let phi = geodetic_latitude.to_radians();
    let scale = 1.0 - WGS84_ECCENTRICITY * WGS84_ECCENTRICITY;
    (scale * phi.sin()).atan2(phi.cos()).to_degrees()
}

/// Inverse of [`geodetic_to_geocentric_latitude`]
pub fn geocentric_to_geodetic_latitude(geocentric_latitude: f64) -> f64 {
    let phi = geocentric_latitude.to_radians();
    let scale = 1.0 - WGS84_ECCENTRICITY * WGS84_ECCENTRICITY;
    phi.sin().atan2(scale * phi.cos()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_spherical_round_trip() {
        let xyz = spherical_to_cartesian(0.3, -0.7, 12.5);
        let back = cartesian_to_spherical(xyz[0], xyz[1], xyz[2]);
        assert!(close(back, [0.3, -0.7, 12.5]));

        let pole = spherical_to_cartesian(1.0, FRAC_PI_2, 2.0);
        assert!(close(pole, [0.0, 0.0, 2.0]));
    }

    #[test]
    fn test_polar_round_trip() {
        let p = cartesian_to_polar(3.0, 4.0, -1.0);
        assert!((p[1] - 5.0).abs() < 1e-12);
        assert_eq!(p[2], -1.0);
        assert!(close(polar_to_cartesian(p[0], p[1], p[2]), [3.0, 4.0, -1.0]));
    }

    #[test]
    fn test_lon_lat_radius() {
        let xyz = lon_lat_radius_to_xyz(90.0, 0.0, 6371.0);
        assert!(close(xyz, [0.0, 6371.0, 0.0]));
        let back = xyz_to_lon_lat_radius(xyz[0], xyz[1], xyz[2]);
        assert!(close(back, [90.0, 0.0, 6371.0]));
    }

    #[test]
    fn test_geocentric_latitude_round_trip() {
        assert!(geodetic_to_geocentric_latitude(0.0).abs() < 1e-12);
        assert!((geodetic_to_geocentric_latitude(90.0) - 90.0).abs() < 1e-9);
        let gc = geodetic_to_geocentric_latitude(45.0);
        assert!(gc < 45.0 && gc > 44.8);
        assert!((geocentric_to_geodetic_latitude(gc) - 45.0).abs() < 1e-9);
    }
}
