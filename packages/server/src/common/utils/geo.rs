//! Coordinate helpers.

/// Two locations closer than this are treated as the same place.
pub const SAME_LOCATION_RADIUS_METERS: f64 = 50.0;

/// Whether a latitude/longitude pair is usable (finite and in range)
pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Calculate distance between two coordinates in kilometers
///
/// Uses Haversine formula for accuracy on Earth's surface
///
/// # Arguments
/// * `lat1`, `lng1` - First coordinate
/// * `lat2`, `lng2` - Second coordinate
///
/// # Returns
/// Distance in kilometers
pub fn calculate_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance in meters, see [`calculate_distance_km`]
pub fn calculate_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    calculate_distance_km(lat1, lng1, lat2, lng2) * 1000.0
}
