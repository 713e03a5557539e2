use geodist::{
    distance_one_to_many, distance_pairs, distance_single, distance_vector, Coordinate, GeoError,
    EARTH_RADIUS_KM,
};

const CITIES: [(f64, f64); 5] = [
    (-74.0060, 40.7128),  // New York
    (-0.1276, 51.5074),   // London
    (139.6917, 35.6895),  // Tokyo
    (151.2093, -33.8688), // Sydney
    (-58.3816, -34.6037), // Buenos Aires
];

fn columns() -> (Vec<f64>, Vec<f64>) {
    CITIES.iter().copied().unzip()
}

#[test]
fn test_all_pairs_symmetric_and_bounded() {
    for &(lon1, lat1) in &CITIES {
        for &(lon2, lat2) in &CITIES {
            let ab = distance_single(lon1, lat1, lon2, lat2);
            let ba = distance_single(lon2, lat2, lon1, lat1);
            assert!((ab - ba).abs() < 1e-9);
            assert!(ab >= 0.0 && ab <= std::f64::consts::PI * EARTH_RADIUS_KM);
        }
    }
}

#[test]
fn test_vector_and_broadcast_agree() {
    let (lons, lats) = columns();
    let n = lons.len() as i64;
    let (ny_lon, ny_lat) = CITIES[0];
    let ny_lons = vec![ny_lon; lons.len()];
    let ny_lats = vec![ny_lat; lats.len()];

    let vector = distance_vector(&ny_lons, &ny_lats, &lons, &lats, n).unwrap();
    let broadcast = distance_one_to_many(ny_lon, ny_lat, &lons, &lats, n).unwrap();
    assert_eq!(vector, broadcast);
    assert_eq!(vector[0], 0.0);
    assert!((vector[1] - 5570.0).abs() < 20.0);
}

#[test]
fn test_pairs_match_vector() {
    let from: Vec<Coordinate> = CITIES.iter().copied().map(Coordinate::from).collect();
    let to: Vec<Coordinate> = from.iter().rev().copied().collect();
    let out = distance_pairs(&from, &to).unwrap();
    for (i, d) in out.iter().enumerate() {
        assert_eq!(*d, from[i].distance_to(&to[i]));
    }
}

#[test]
fn test_count_longer_than_input() {
    let (lons, lats) = columns();
    let err = distance_one_to_many(0.0, 0.0, &lons, &lats, lons.len() as i64 + 1).unwrap_err();
    assert!(matches!(err, GeoError::InvalidArgument { .. }));
}

#[test]
fn test_out_of_range_degrees_accepted() {
    let d = distance_single(370.0, 10.0, 10.0, 10.0);
    assert!(d.abs() < 1e-3, "got {}", d);
    assert!(distance_single(0.0, 100.0, 0.0, 80.0).is_finite());
}
