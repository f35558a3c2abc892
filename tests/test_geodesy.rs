use approx::assert_relative_eq;
use seiscore::core::coordinates::GeodeticCoordinate;
use seiscore::core::earth_model;

#[test]
fn test_azimuthal_gap_example() {
    assert_relative_eq!(earth_model::az_gap_from_azimuths(&[10.0, 90.0, 200.0]), 170.0);
    assert_relative_eq!(earth_model::az_gap_from_azimuths(&[200.0, 10.0, 90.0]), 170.0);
}

#[test]
fn test_azimuthal_gap_bad_input() {
    assert_eq!(earth_model::azimuthal_gap(0.0, 0.0, &[], &[]), -1.0);
    assert_eq!(earth_model::azimuthal_gap(0.0, 0.0, &[1.0, 2.0], &[1.0]), -1.0);
}

#[test]
fn test_geodetic_ecef_round_trip() {
    let points = [
        GeodeticCoordinate::new(0.0, 0.0, 0.0),
        GeodeticCoordinate::new(37.7749, -122.4194, 12.5),
        GeodeticCoordinate::new(-33.8688, 151.2093, 0.0),
        GeodeticCoordinate::new(64.1466, -21.9426, 35.0),
        GeodeticCoordinate::new(-77.85, 166.67, 3.0),
    ];
    for p in &points {
        let ecef = earth_model::geodetic_to_ecef(p);
        let back = earth_model::ecef_to_geodetic(&ecef);
        assert!((back.lat - p.lat).abs() < 1e-6, "lat {} vs {}", back.lat, p.lat);
        assert!((back.lon - p.lon).abs() < 1e-6, "lon {} vs {}", back.lon, p.lon);
        let again = earth_model::geodetic_to_ecef(&back);
        assert!(ecef.separation_meters(&again) < 1e-3);
    }
}

#[test]
fn test_local_frame_round_trip() {
    let origin = GeodeticCoordinate::new(35.0, -106.5, 0.0);
    let point = GeodeticCoordinate::new(35.2, -106.1, 4.0);
    let nez = earth_model::local_coords(&origin, &point);
    assert!(nez.north_km > 0.0 && nez.east_km > 0.0);
    let back = earth_model::geodetic_coords(&origin, &nez);
    assert!((back.lat - point.lat).abs() < 1e-6);
    assert!((back.lon - point.lon).abs() < 1e-6);
    assert!((back.depth_km - point.depth_km).abs() < 1e-3);
}

#[test]
fn test_distance_and_azimuth_consistency() {
    let (evla, evlo) = (41.3, 129.0);
    let (stla, stlo) = (44.617, 129.591);
    let dist = earth_model::distance_km(evla, evlo, stla, stlo);
    assert!(dist > 360.0 && dist < 380.0, "distance {}", dist);

    let az = earth_model::azimuth(evla, evlo, stla, stlo);
    let baz = earth_model::back_azimuth(stla, stlo, evla, evlo);
    assert!(az > 0.0 && az < 20.0);
    assert!(baz > 180.0 && baz < 200.0);
}

#[test]
fn test_reckon_then_measure() {
    let end = earth_model::reckon(10.0, 20.0, 15.0, 60.0);
    let delta = earth_model::great_circle_delta(10.0, 20.0, end.lat, end.lon);
    assert_relative_eq!(delta, 15.0, epsilon = 1e-6);
    let az = earth_model::great_circle_azimuth(10.0, 20.0, end.lat, end.lon);
    assert_relative_eq!(az, 60.0, epsilon = 1e-6);
}

#[test]
fn test_track_and_small_circle_sizes() {
    let track = earth_model::track(0.0, 0.0, 10.0, 10.0, 5);
    assert_eq!(track.len(), 6);
    assert!((track[0].lat).abs() < 1e-9);
    assert!((track[5].lat - 10.0).abs() < 1e-6);

    let center = GeodeticCoordinate::new(45.0, 10.0, 0.0);
    let ring = earth_model::small_circle(&center, 5.0, 2);
    assert_eq!(ring.len(), 5);
    assert!((ring[0].lat - ring[4].lat).abs() < 1e-9);
    assert!((ring[0].lon - ring[4].lon).abs() < 1e-9);
}

#[test]
fn test_batch_local_coords_match_single() {
    let origin = GeodeticCoordinate::new(-20.0, 134.0, 0.0);
    let stations: Vec<GeodeticCoordinate> = (0..50)
        .map(|i| GeodeticCoordinate::new(-20.0 + 0.05 * i as f64, 134.0 - 0.03 * i as f64, 0.1))
        .collect();
    let batch = earth_model::local_coords_batch(&origin, &stations);
    assert_eq!(batch.len(), stations.len());
    for (nez, station) in batch.iter().zip(&stations) {
        let single = earth_model::local_coords(&origin, station);
        assert!(nez.subtract(&single).norm() < 1e-9);
    }
}

#[test]
fn test_near_antipodal_azimuth_and_distance_reach_station() {
    for &(stla, stlo) in &[(0.2, 179.7), (-0.3, 179.8), (5.0, -175.0)] {
        let az = earth_model::azimuth(0.0, 0.0, stla, stlo);
        let arc = earth_model::distance_degrees(0.0, 0.0, stla, stlo);
        let landed = earth_model::reckon_wgs84(0.0, 0.0, arc, az);
        assert!((landed.lat - stla).abs() < 1e-5, "lat {} vs {}", landed.lat, stla);
        assert!((landed.lon - stlo).abs() < 1e-5, "lon {} vs {}", landed.lon, stlo);
        assert!(earth_model::distance_km(0.0, 0.0, stla, stlo) > 19_000.0);
    }
}
