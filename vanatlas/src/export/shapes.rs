//! Drawn-shape KML export.

use geojson::{Feature, FeatureCollection};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use super::ExportError;
use crate::draw::{DrawnShape, ShapeCollection};
use crate::kml::write_kml;

/// Convert shapes into a FeatureCollection with measurements and shape kind
/// merged into each feature's properties.
pub fn shapes_to_feature_collection<'a>(
    shapes: impl Iterator<Item = &'a DrawnShape>,
) -> FeatureCollection {
    let features = shapes
        .map(|shape| {
            let mut properties = shape.extra_properties.clone();
            if let Some(name) = &shape.name {
                properties.insert("name".to_string(), Value::String(name.clone()));
            }
            if let Some(description) = &shape.description {
                properties.insert(
                    "description".to_string(),
                    Value::String(description.clone()),
                );
            }
            properties.insert(
                "shapeType".to_string(),
                Value::String(shape.kind.to_string()),
            );
            for (key, value) in shape.measurements.to_properties() {
                properties.insert(key, value);
            }

            Feature {
                bbox: None,
                geometry: Some(shape.geometry.to_geojson()),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Export the shape collection to a `.kml` file in `dir`.
///
/// The file is named `drawn-shapes-{timestamp}.kml`.
pub fn write_shapes_kml(dir: &Path, collection: &ShapeCollection) -> Result<PathBuf, ExportError> {
    if collection.is_empty() {
        return Err(ExportError::NothingToExport(
            "No drawn shapes to export".to_string(),
        ));
    }

    let fc = shapes_to_feature_collection(collection.iter());
    let kml = write_kml(&fc, "Drawn Shapes Export")?;

    let path = dir.join(format!(
        "drawn-shapes-{}.kml",
        chrono::Utc::now().timestamp_millis()
    ));
    std::fs::write(&path, kml)?;
    info!(
        path = %path.display(),
        shapes = collection.len(),
        "Shapes exported as KML"
    );
    Ok(path)
}
