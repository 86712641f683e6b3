//! Geodesic measurement utilities.
//!
//! Pure functions for great-circle distance, polyline length, spherical
//! polygon area, and the metric display formatting used across the drawing
//! and export layers. All inputs are [`LatLng`] coordinates in degrees.

mod types;

pub use types::{LatLng, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

use std::f64::consts::PI;

/// Earth radius in meters used for spherical-excess area computation.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Mean Earth radius in meters used for haversine distances.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Computes the great-circle distance between two points in meters.
///
/// Uses the haversine formula over the mean Earth radius.
#[inline]
pub fn distance_between(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().asin()
}

/// Computes the total length of a polyline in meters.
///
/// Sums the pairwise great-circle distances of consecutive points.
/// Returns 0 for an empty sequence or a single point.
pub fn line_distance(points: &[LatLng]) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_between(pair[0], pair[1]))
        .sum()
}

/// Computes the unsigned area of a polygon in square meters.
///
/// Uses the spherical-excess approximation over [`EARTH_RADIUS_M`]. The ring
/// is treated as implicitly closed; a trailing point equal to the first is
/// tolerated. Fewer than 3 distinct vertices yield 0.
///
/// The result is independent of winding direction and of which vertex the
/// ring starts at.
pub fn polygon_area(points: &[LatLng]) -> f64 {
    // Drop an explicit closing point so the modulo wrap does not double
    // count the closing edge.
    let ring = match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    };

    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let lat1 = ring[i].lat.to_radians();
        let lat2 = ring[j].lat.to_radians();
        let dlon = (ring[j].lon - ring[i].lon).to_radians();
        sum += dlon * (lat1.sin() + lat2.sin());
    }

    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Computes the perimeter of a polygon ring in meters.
///
/// Closes the ring if the last point differs from the first.
pub fn perimeter(points: &[LatLng]) -> f64 {
    match points {
        [] | [_] => 0.0,
        [first, .., last] if first == last => line_distance(points),
        [first, .., last] => line_distance(points) + distance_between(*last, *first),
    }
}

/// Computes the area and circumference of a circle from its radius in meters.
#[inline]
pub fn circle_measurements(radius_m: f64) -> (f64, f64) {
    (PI * radius_m * radius_m, 2.0 * PI * radius_m)
}

/// Formats a distance for display.
///
/// Values below 1000 m render as whole meters (`"999 m"`); larger values as
/// kilometers with two decimals (`"1.00 km"`).
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Formats an area for display.
///
/// Below 10 000 m² renders as whole square meters, below 1 000 000 m² as
/// hectares with two decimals, and anything larger as square kilometers
/// with two decimals.
pub fn format_area(sq_meters: f64) -> String {
    if sq_meters < 10_000.0 {
        format!("{:.0} m²", sq_meters)
    } else if sq_meters < 1_000_000.0 {
        format!("{:.2} ha", sq_meters / 10_000.0)
    } else {
        format!("{:.2} km²", sq_meters / 1_000_000.0)
    }
}
