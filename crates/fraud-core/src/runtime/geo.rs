// fraud-core/src/runtime/geo.rs
// ============================================================================
// Module: Geo Distance
// Description: Great-circle distance between two points.
// Purpose: Compute geo-distance-from-usual-location for the feature engine.
// Dependencies: none (pure)
// ============================================================================

//! ## Overview
//! Pure Haversine great-circle distance, used by the feature engine to
//! derive `geo_distance_km` between an entity's usual location and the
//! current event's resolved IP geolocation (§4.2). Component internals are
//! pure and non-suspending (§5).

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Computes the great-circle distance in kilometers between two
/// (latitude, longitude) points given in decimal degrees.
#[must_use]
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_has_zero_distance() {
        assert!((haversine_km((40.7128, -74.0060), (40.7128, -74.0060))).abs() < 1e-9);
    }

    #[test]
    fn new_york_to_london_is_roughly_right() {
        let distance = haversine_km((40.7128, -74.0060), (51.5074, -0.1278));
        assert!((5500.0..5600.0).contains(&distance), "distance was {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = (10.0, 20.0);
        let b = (30.0, 40.0);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
