//! KML export.
//!
//! Serializes GeoJSON features into KML 2.2 Placemark XML. Properties are
//! flattened into the placemark `<description>`; Point, LineString, Polygon
//! and MultiPolygon geometries are supported, everything else is skipped
//! with a warning.

use geojson::{Feature, FeatureCollection, Value as GeoValue};
use quick_xml::escape::escape;
use tracing::warn;

use super::KmlError;

const KML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
"#;

/// Render a FeatureCollection as a KML document.
///
/// # Arguments
///
/// * `collection` - Features to serialize
/// * `title` - Document name shown by KML viewers
pub fn write_kml(collection: &FeatureCollection, title: &str) -> Result<String, KmlError> {
    let mut kml = String::from(KML_HEADER);
    kml.push_str("  <Document>\n");
    kml.push_str(&format!("    <name>{}</name>\n", escape(title)));

    for (index, feature) in collection.features.iter().enumerate() {
        if let Some(placemark) = placemark_for(feature, index) {
            kml.push_str(&placemark);
        }
    }

    kml.push_str("  </Document>\n</kml>\n");
    Ok(kml)
}

/// Pick a display name for a feature.
///
/// Boundary exports carry their region name under the source schema's key;
/// annotation exports carry `name`.
fn feature_name(feature: &Feature, index: usize) -> String {
    for key in ["name", "sdtname", "dtname", "STNAME"] {
        if let Some(value) = feature.property(key).and_then(|v| v.as_str()) {
            if !value.trim().is_empty() {
                return value.to_string();
            }
        }
    }
    format!("Feature {}", index + 1)
}

/// Flatten all properties into description text.
fn feature_description(feature: &Feature) -> String {
    let Some(properties) = &feature.properties else {
        return String::new();
    };
    let mut lines = Vec::new();
    for (key, value) in properties {
        let rendered = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("{}: {}", key, rendered));
    }
    lines.join("\n")
}

fn placemark_for(feature: &Feature, index: usize) -> Option<String> {
    let geometry = feature.geometry.as_ref()?;
    let body = geometry_xml(&geometry.value, index)?;

    let mut placemark = String::from("    <Placemark>\n");
    placemark.push_str(&format!(
        "      <name>{}</name>\n",
        escape(&feature_name(feature, index))
    ));
    let description = feature_description(feature);
    if !description.is_empty() {
        placemark.push_str(&format!(
            "      <description>{}</description>\n",
            escape(&description)
        ));
    }
    placemark.push_str(&body);
    placemark.push_str("    </Placemark>\n");
    Some(placemark)
}

fn geometry_xml(value: &GeoValue, index: usize) -> Option<String> {
    match value {
        GeoValue::Point(position) => Some(format!(
            "      <Point>\n        <coordinates>{}</coordinates>\n      </Point>\n",
            position_text(position)
        )),
        GeoValue::LineString(positions) => Some(format!(
            "      <LineString>\n        <coordinates>{}</coordinates>\n      </LineString>\n",
            positions_text(positions)
        )),
        GeoValue::Polygon(rings) => polygon_xml(rings, "      "),
        GeoValue::MultiPolygon(polygons) => {
            let mut parts = Vec::new();
            for rings in polygons {
                if let Some(xml) = polygon_xml(rings, "        ") {
                    parts.push(xml);
                }
            }
            if parts.is_empty() {
                return None;
            }
            Some(format!(
                "      <MultiGeometry>\n{}      </MultiGeometry>\n",
                parts.concat()
            ))
        }
        other => {
            warn!(
                index = index,
                geometry = geometry_type_name(other),
                "Skipping unsupported geometry in KML export"
            );
            None
        }
    }
}

fn polygon_xml(rings: &[Vec<Vec<f64>>], indent: &str) -> Option<String> {
    let outer = rings.first()?;
    Some(format!(
        "{i}<Polygon>\n{i}  <outerBoundaryIs>\n{i}    <LinearRing>\n{i}      <coordinates>{coords}</coordinates>\n{i}    </LinearRing>\n{i}  </outerBoundaryIs>\n{i}</Polygon>\n",
        i = indent,
        coords = positions_text(outer)
    ))
}

fn position_text(position: &[f64]) -> String {
    match position {
        [lon, lat, ..] => format!("{},{}", lon, lat),
        _ => String::new(),
    }
}

fn positions_text(positions: &[Vec<f64>]) -> String {
    positions
        .iter()
        .map(|p| position_text(p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn geometry_type_name(value: &GeoValue) -> &'static str {
    match value {
        GeoValue::Point(_) => "Point",
        GeoValue::MultiPoint(_) => "MultiPoint",
        GeoValue::LineString(_) => "LineString",
        GeoValue::MultiLineString(_) => "MultiLineString",
        GeoValue::Polygon(_) => "Polygon",
        GeoValue::MultiPolygon(_) => "MultiPolygon",
        GeoValue::GeometryCollection(_) => "GeometryCollection",
    }
}
