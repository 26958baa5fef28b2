//! Great-circle distance on a spherical Earth.

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance in meters between two (lat, lon) points in decimal degrees.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Clamp guards against a slightly > 1.0 from rounding on antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(haversine_meters(-22.911, -43.2094, -22.911, -43.2094), 0.0);
    }

    #[test]
    fn test_small_latitude_offset() {
        // 0.0009 degrees of latitude is roughly 100 meters.
        let d = haversine_meters(0.0, 0.0, 0.0009, 0.0);
        assert!((d - 100.08).abs() < 0.1, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = haversine_meters(-22.9, -43.2, -22.95, -43.15);
        let b = haversine_meters(-22.95, -43.15, -22.9, -43.2);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = haversine_meters(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }
}
