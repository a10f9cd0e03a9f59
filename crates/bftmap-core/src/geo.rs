//! Great-circle distance and viewport geometry.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`distance_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two WGS84 coordinates, in meters.
#[must_use]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Axis-aligned map viewport as reported by the map widget after pan/zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ViewportBounds {
    #[must_use]
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Inclusive containment: `south <= lat <= north` and `west <= lng <= east`.
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        self.south <= lat && lat <= self.north && self.west <= lng && lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO_STATION: (f64, f64) = (35.681_2, 139.767_1);
    const SHINJUKU_STATION: (f64, f64) = (35.690_9, 139.700_3);

    #[test]
    fn distance_to_self_is_zero() {
        let (lat, lng) = TOKYO_STATION;
        assert!(distance_meters(lat, lng, lat, lng).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let (a_lat, a_lng) = TOKYO_STATION;
        let (b_lat, b_lng) = SHINJUKU_STATION;
        let ab = distance_meters(a_lat, a_lng, b_lat, b_lng);
        let ba = distance_meters(b_lat, b_lng, a_lat, a_lng);
        assert!((ab - ba).abs() < 1e-6, "ab={ab} ba={ba}");
    }

    #[test]
    fn tokyo_to_shinjuku_is_about_six_km() {
        let (a_lat, a_lng) = TOKYO_STATION;
        let (b_lat, b_lng) = SHINJUKU_STATION;
        let d = distance_meters(a_lat, a_lng, b_lat, b_lng);
        assert!(d > 5_900.0 && d < 6_300.0, "got {d}");
    }

    #[test]
    fn one_ten_thousandth_degree_of_latitude_is_about_eleven_meters() {
        let d = distance_meters(35.0, 139.0, 35.000_1, 139.0);
        assert!(d > 10.0 && d < 12.0, "got {d}");
    }

    #[test]
    fn viewport_contains_is_inclusive() {
        let bounds = ViewportBounds::new(35.70, 35.60, 139.80, 139.70);
        assert!(bounds.contains(35.65, 139.75));
        assert!(bounds.contains(35.70, 139.80), "edges count as inside");
        assert!(bounds.contains(35.60, 139.70));
        assert!(!bounds.contains(35.71, 139.75));
        assert!(!bounds.contains(35.65, 139.69));
    }
}
