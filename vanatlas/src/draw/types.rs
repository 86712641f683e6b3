//! Shape types for the drawing and annotation layer.

use crate::geom::{self, LatLng};
use geojson::{Geometry, Value as GeoValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// The kind of an annotation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polyline,
    Polygon,
    Rectangle,
    Circle,
    Marker,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Polyline => write!(f, "polyline"),
            ShapeKind::Polygon => write!(f, "polygon"),
            ShapeKind::Rectangle => write!(f, "rectangle"),
            ShapeKind::Circle => write!(f, "circle"),
            ShapeKind::Marker => write!(f, "marker"),
        }
    }
}

/// Unique, time-based shape identifier.
///
/// Ids are the creation time in Unix milliseconds, nudged forward when two
/// shapes land in the same millisecond so ids stay strictly increasing
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub i64);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

impl ShapeId {
    /// Allocate the next id.
    pub fn next() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(
                last,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return ShapeId(candidate),
                Err(observed) => last = observed,
            }
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a shape came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeSource {
    /// Drawn by hand in this session.
    Drawn,
    /// Imported from a KML/KMZ file.
    Imported { file: String },
}

impl ShapeSource {
    pub fn is_imported(&self) -> bool {
        matches!(self, ShapeSource::Imported { .. })
    }
}

/// Typed geometry of an annotation shape.
///
/// Polygon rings are stored open (no repeated closing vertex).
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Polyline(Vec<LatLng>),
    Polygon(Vec<LatLng>),
    Rectangle {
        south_west: LatLng,
        north_east: LatLng,
    },
    Circle {
        center: LatLng,
        radius_m: f64,
    },
    Marker(LatLng),
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Polyline(_) => ShapeKind::Polyline,
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::Rectangle { .. } => ShapeKind::Rectangle,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Marker(_) => ShapeKind::Marker,
        }
    }

    /// The rectangle's four corners as an open ring, southwest first,
    /// counter-clockwise.
    pub fn rectangle_ring(south_west: LatLng, north_east: LatLng) -> Vec<LatLng> {
        vec![
            south_west,
            LatLng::new(south_west.lat, north_east.lon),
            north_east,
            LatLng::new(north_east.lat, south_west.lon),
        ]
    }

    /// Convert to GeoJSON geometry.
    ///
    /// Rectangles become closed Polygon rings; circles and markers become
    /// Points (a circle's radius travels in the feature properties).
    pub fn to_geojson(&self) -> Geometry {
        let value = match self {
            ShapeGeometry::Polyline(points) => {
                GeoValue::LineString(points.iter().map(|p| p.to_position()).collect())
            }
            ShapeGeometry::Polygon(points) => {
                GeoValue::Polygon(vec![close_ring(points)])
            }
            ShapeGeometry::Rectangle {
                south_west,
                north_east,
            } => {
                let ring = Self::rectangle_ring(*south_west, *north_east);
                GeoValue::Polygon(vec![close_ring(&ring)])
            }
            ShapeGeometry::Circle { center, .. } => GeoValue::Point(center.to_position()),
            ShapeGeometry::Marker(point) => GeoValue::Point(point.to_position()),
        };
        Geometry::new(value)
    }

    /// All vertices of the shape, in drawing order.
    pub fn vertices(&self) -> Vec<LatLng> {
        match self {
            ShapeGeometry::Polyline(points) | ShapeGeometry::Polygon(points) => points.clone(),
            ShapeGeometry::Rectangle {
                south_west,
                north_east,
            } => Self::rectangle_ring(*south_west, *north_east),
            ShapeGeometry::Circle { center, .. } => vec![*center],
            ShapeGeometry::Marker(point) => vec![*point],
        }
    }
}

fn close_ring(points: &[LatLng]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points.iter().map(|p| p.to_position()).collect();
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if first != last {
            ring.push(first.to_position());
        }
    }
    ring
}

/// Formatted measurements of a completed shape.
///
/// Computed once on completion with the display formatting applied, exactly
/// as shown in tooltips and exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurements {
    pub distance: Option<String>,
    pub area: Option<String>,
    pub perimeter: Option<String>,
    pub radius: Option<String>,
}

impl Measurements {
    /// Measure a geometry according to its kind.
    ///
    /// Polylines get a distance; polygons and rectangles area + perimeter;
    /// circles area + radius + circumference; markers nothing.
    pub fn of(geometry: &ShapeGeometry) -> Self {
        match geometry {
            ShapeGeometry::Polyline(points) => Self {
                distance: Some(geom::format_distance(geom::line_distance(points))),
                ..Self::default()
            },
            ShapeGeometry::Polygon(points) => Self {
                area: Some(geom::format_area(geom::polygon_area(points))),
                perimeter: Some(geom::format_distance(geom::perimeter(points))),
                ..Self::default()
            },
            ShapeGeometry::Rectangle {
                south_west,
                north_east,
            } => {
                let ring = ShapeGeometry::rectangle_ring(*south_west, *north_east);
                Self {
                    area: Some(geom::format_area(geom::polygon_area(&ring))),
                    perimeter: Some(geom::format_distance(geom::perimeter(&ring))),
                    ..Self::default()
                }
            }
            ShapeGeometry::Circle { radius_m, .. } => {
                let (area, circumference) = geom::circle_measurements(*radius_m);
                Self {
                    area: Some(geom::format_area(area)),
                    perimeter: Some(geom::format_distance(circumference)),
                    radius: Some(geom::format_distance(*radius_m)),
                    ..Self::default()
                }
            }
            ShapeGeometry::Marker(_) => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_none()
            && self.area.is_none()
            && self.perimeter.is_none()
            && self.radius.is_none()
    }

    /// Flatten into JSON properties for export.
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(d) = &self.distance {
            map.insert("distance".to_string(), Value::String(d.clone()));
        }
        if let Some(a) = &self.area {
            map.insert("area".to_string(), Value::String(a.clone()));
        }
        if let Some(p) = &self.perimeter {
            map.insert("perimeter".to_string(), Value::String(p.clone()));
        }
        if let Some(r) = &self.radius {
            map.insert("radius".to_string(), Value::String(r.clone()));
        }
        map
    }
}

/// A completed annotation shape.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub geometry: ShapeGeometry,
    /// Display name, mostly from imports.
    pub name: Option<String>,
    /// Free-text description, mostly from imports.
    pub description: Option<String>,
    /// Extra properties carried through an import (ExtendedData).
    pub extra_properties: Map<String, Value>,
    pub measurements: Measurements,
    pub source: ShapeSource,
}

impl DrawnShape {
    /// Build a shape from a completed geometry, measuring it in the process.
    pub fn drawn(geometry: ShapeGeometry) -> Self {
        let measurements = Measurements::of(&geometry);
        Self {
            id: ShapeId::next(),
            kind: geometry.kind(),
            geometry,
            name: None,
            description: None,
            extra_properties: Map::new(),
            measurements,
            source: ShapeSource::Drawn,
        }
    }
}

/// One file-import action: the shapes it produced, removable as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedFileSet {
    pub file_name: String,
    pub shape_ids: Vec<ShapeId>,
    pub imported_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_ids_strictly_increase() {
        let a = ShapeId::next();
        let b = ShapeId::next();
        let c = ShapeId::next();
        assert!(a < b && b < c, "Ids must be strictly increasing");
    }

    #[test]
    fn test_rectangle_ring_corners() {
        let ring = ShapeGeometry::rectangle_ring(LatLng::new(20.0, 85.0), LatLng::new(21.0, 86.0));
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], LatLng::new(20.0, 85.0));
        assert_eq!(ring[1], LatLng::new(20.0, 86.0));
        assert_eq!(ring[2], LatLng::new(21.0, 86.0));
        assert_eq!(ring[3], LatLng::new(21.0, 85.0));
    }

    #[test]
    fn test_polygon_geojson_ring_is_closed() {
        let shape = ShapeGeometry::Polygon(vec![
            LatLng::new(20.0, 85.0),
            LatLng::new(20.0, 86.0),
            LatLng::new(21.0, 85.5),
        ]);
        let geometry = shape.to_geojson();
        match geometry.value {
            GeoValue::Polygon(rings) => {
                let ring = &rings[0];
                assert_eq!(ring.len(), 4);
                assert_eq!(ring.first(), ring.last());
            }
            other => panic!("Expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_circle_geojson_is_point() {
        let shape = ShapeGeometry::Circle {
            center: LatLng::new(20.0, 85.0),
            radius_m: 250.0,
        };
        assert!(matches!(shape.to_geojson().value, GeoValue::Point(_)));
    }

    #[test]
    fn test_measurements_polyline_distance_only() {
        let m = Measurements::of(&ShapeGeometry::Polyline(vec![
            LatLng::new(20.0, 85.0),
            LatLng::new(20.1, 85.0),
        ]));
        assert!(m.distance.is_some());
        assert!(m.area.is_none());
        assert!(m.perimeter.is_none());
    }

    #[test]
    fn test_measurements_polygon_area_and_perimeter() {
        let m = Measurements::of(&ShapeGeometry::Polygon(vec![
            LatLng::new(20.0, 85.0),
            LatLng::new(20.0, 85.1),
            LatLng::new(20.1, 85.1),
            LatLng::new(20.1, 85.0),
        ]));
        assert!(m.area.is_some());
        assert!(m.perimeter.is_some());
        assert!(m.distance.is_none());
        assert!(m.radius.is_none());
    }

    #[test]
    fn test_measurements_circle() {
        let m = Measurements::of(&ShapeGeometry::Circle {
            center: LatLng::new(20.0, 85.0),
            radius_m: 100.0,
        });
        assert_eq!(m.radius.as_deref(), Some("100 m"));
        // π · 100² ≈ 31 416 m², formatted as hectares.
        assert_eq!(m.area.as_deref(), Some("3.14 ha"));
        assert_eq!(m.perimeter.as_deref(), Some("628 m"));
    }

    #[test]
    fn test_measurements_marker_empty() {
        let m = Measurements::of(&ShapeGeometry::Marker(LatLng::new(20.0, 85.0)));
        assert!(m.is_empty());
    }

    #[test]
    fn test_measurements_to_properties() {
        let m = Measurements {
            distance: Some("1.00 km".to_string()),
            area: None,
            perimeter: None,
            radius: None,
        };
        let props = m.to_properties();
        assert_eq!(props.len(), 1);
        assert_eq!(props["distance"], Value::String("1.00 km".to_string()));
    }

    #[test]
    fn test_drawn_shape_measures_on_construction() {
        let shape = DrawnShape::drawn(ShapeGeometry::Polyline(vec![
            LatLng::new(20.0, 85.0),
            LatLng::new(20.5, 85.0),
        ]));
        assert_eq!(shape.kind, ShapeKind::Polyline);
        assert!(shape.measurements.distance.is_some());
        assert_eq!(shape.source, ShapeSource::Drawn);
    }
}
