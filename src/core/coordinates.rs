//! Coordinate value types for the frames used by the earth model.
//!
//! Each type is a plain immutable value; conversions live in [`crate::core::earth_model`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticCoordinate {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Depth below the ellipsoid in km (positive down)
    pub depth_km: f64,
    /// Elevation of the surface above the ellipsoid in km
    pub elevation_km: f64,
}

impl GeodeticCoordinate {
    pub fn new(lat: f64, lon: f64, depth_km: f64) -> Self {
        Self {
            lat,
            lon,
            depth_km,
            elevation_km: 0.0,
        }
    }

    pub fn with_elevation(lat: f64, lon: f64, depth_km: f64, elevation_km: f64) -> Self {
        Self {
            lat,
            lon,
            depth_km,
            elevation_km,
        }
    }

    /// Surface point (zero depth)
    pub fn surface(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, 0.0)
    }

    /// Arithmetic mean of a set of coordinates, None for an empty set.
    ///
    /// Longitudes are averaged as unit vectors so that points straddling the
    /// antimeridian do not collapse onto the prime meridian.
    pub fn centroid(coords: &[GeodeticCoordinate]) -> Option<GeodeticCoordinate> {
        if coords.is_empty() {
            return None;
        }
        let n = coords.len() as f64;
        let (mut lat, mut sin_lon, mut cos_lon, mut depth, mut elev) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for c in coords {
            lat += c.lat;
            sin_lon += c.lon.to_radians().sin();
            cos_lon += c.lon.to_radians().cos();
            depth += c.depth_km;
            elev += c.elevation_km;
        }
        Some(GeodeticCoordinate::with_elevation(
            lat / n,
            sin_lon.atan2(cos_lon).to_degrees(),
            depth / n,
            elev / n,
        ))
    }
}

impl fmt::Display for GeodeticCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat = {:.6}, Lon = {:.6}, Depth = {:.4} km, Elev = {:.4} km",
            self.lat, self.lon, self.depth_km, self.elevation_km
        )
    }
}

/// Earth-centred Earth-fixed Cartesian position in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EcefCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EcefCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn separation_meters(&self, other: &EcefCoordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// East-North-Up tangent-plane position in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnuCoordinate {
    pub east_m: f64,
    pub north_m: f64,
    pub up_m: f64,
}

impl EnuCoordinate {
    pub fn new(east_m: f64, north_m: f64, up_m: f64) -> Self {
        Self {
            east_m,
            north_m,
            up_m,
        }
    }
}

/// North-East-Down local position in km
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NezCoordinate {
    pub north_km: f64,
    pub east_km: f64,
    pub down_km: f64,
}

impl NezCoordinate {
    pub fn new(north_km: f64, east_km: f64, down_km: f64) -> Self {
        Self {
            north_km,
            east_km,
            down_km,
        }
    }

    pub fn subtract(&self, other: &NezCoordinate) -> NezCoordinate {
        NezCoordinate::new(
            self.north_km - other.north_km,
            self.east_km - other.east_km,
            self.down_km - other.down_km,
        )
    }

    /// Euclidean length in km
    pub fn norm(&self) -> f64 {
        (self.north_km * self.north_km + self.east_km * self.east_km + self.down_km * self.down_km)
            .sqrt()
    }

    pub fn horizontal_norm(&self) -> f64 {
        self.north_km.hypot(self.east_km)
    }
}

impl fmt::Display for NezCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "North = {:.4} km, East = {:.4} km, Down = {:.4} km",
            self.north_km, self.east_km, self.down_km
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nez_arithmetic() {
        let a = NezCoordinate::new(3.0, 4.0, 12.0);
        let b = NezCoordinate::new(0.0, 0.0, 0.0);
        assert_eq!(a.subtract(&b), a);
        assert!((a.norm() - 13.0).abs() < 1e-12);
        assert!((a.horizontal_norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_across_antimeridian() {
        let coords = [
            GeodeticCoordinate::surface(10.0, 179.0),
            GeodeticCoordinate::surface(20.0, -179.0),
        ];
        let c = GeodeticCoordinate::centroid(&coords).unwrap();
        assert!((c.lat - 15.0).abs() < 1e-9);
        assert!((c.lon.abs() - 180.0).abs() < 1e-9);
        assert!(GeodeticCoordinate::centroid(&[]).is_none());
    }

    #[test]
    fn test_ecef_separation() {
        let a = EcefCoordinate::new(1.0, 2.0, 2.0);
        let b = EcefCoordinate::default();
        assert!((a.separation_meters(&b) - 3.0).abs() < 1e-12);
    }
}
