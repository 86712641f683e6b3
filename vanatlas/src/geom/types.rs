//! Geographic point type used by the measurement functions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic coordinate in decimal degrees.
///
/// Longitude-first GeoJSON positions convert via [`LatLng::from_position`];
/// the struct itself keeps the latitude-first convention used by the
/// measurement math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees (south negative).
    pub lat: f64,
    /// Longitude in degrees (west negative).
    pub lon: f64,
}

impl LatLng {
    /// Create a new coordinate from latitude and longitude in degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate from a GeoJSON position (`[lon, lat, ...]`).
    ///
    /// Returns `None` if the position has fewer than two components.
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Some(Self {
                lat: *lat,
                lon: *lon,
            }),
            _ => None,
        }
    }

    /// Convert to a GeoJSON position (`[lon, lat]`).
    pub fn to_position(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_position_lon_lat_order() {
        let p = LatLng::from_position(&[78.9629, 20.5937]).unwrap();
        assert_eq!(p.lat, 20.5937);
        assert_eq!(p.lon, 78.9629);
    }

    #[test]
    fn test_from_position_with_altitude() {
        let p = LatLng::from_position(&[85.8245, 20.2961, 45.0]).unwrap();
        assert_eq!(p.lat, 20.2961);
        assert_eq!(p.lon, 85.8245);
    }

    #[test]
    fn test_from_position_too_short() {
        assert!(LatLng::from_position(&[78.9629]).is_none());
        assert!(LatLng::from_position(&[]).is_none());
    }

    #[test]
    fn test_to_position_roundtrip() {
        let p = LatLng::new(20.5937, 78.9629);
        let pos = p.to_position();
        assert_eq!(LatLng::from_position(&pos), Some(p));
    }

    #[test]
    fn test_display_precision() {
        let p = LatLng::new(20.5937, 78.9629);
        assert_eq!(format!("{}", p), "20.593700, 78.962900");
    }
}
