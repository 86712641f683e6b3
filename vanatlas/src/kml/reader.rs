//! KML/KMZ import.
//!
//! Parses Placemark elements into annotation shapes. Placemarks that cannot
//! be parsed are skipped with a warning; only a malformed document as a
//! whole is an error. KMZ archives are unzipped in memory to locate the
//! inner KML.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use tracing::{info, warn};

use super::KmlError;
use crate::draw::{DrawnShape, Measurements, ShapeGeometry, ShapeId, ShapeSource};
use crate::geom::LatLng;

/// One feature recovered from a KML Placemark.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedFeature {
    pub name: String,
    pub description: String,
    pub geometry: ShapeGeometry,
    /// ExtendedData entries, preserved as string properties.
    pub extended: Map<String, Value>,
}

impl ImportedFeature {
    /// Convert into a collection shape, measuring the geometry.
    pub fn into_shape(self, file_name: &str) -> DrawnShape {
        let measurements = Measurements::of(&self.geometry);
        DrawnShape {
            id: ShapeId::next(),
            kind: self.geometry.kind(),
            geometry: self.geometry,
            name: Some(self.name),
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description)
            },
            extra_properties: self.extended,
            measurements,
            source: ShapeSource::Imported {
                file: file_name.to_string(),
            },
        }
    }
}

/// Result of parsing one KML document.
#[derive(Debug, Clone, Default)]
pub struct KmlImport {
    pub features: Vec<ImportedFeature>,
    /// Placemarks skipped because their geometry could not be parsed.
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct PlacemarkDraft {
    name: Option<String>,
    description: Option<String>,
    point: Option<String>,
    line: Option<String>,
    polygon: Option<String>,
    extended: Vec<(String, String)>,
}

impl PlacemarkDraft {
    fn into_feature(self, index: usize) -> Option<ImportedFeature> {
        let geometry = if let Some(text) = &self.point {
            let coords = parse_coordinates(text);
            ShapeGeometry::Marker(*coords.first()?)
        } else if let Some(text) = &self.line {
            let coords = parse_coordinates(text);
            if coords.len() < 2 {
                return None;
            }
            ShapeGeometry::Polyline(coords)
        } else if let Some(text) = &self.polygon {
            let mut coords = parse_coordinates(text);
            // Rings are stored open; drop an explicit closing vertex.
            if coords.len() > 1 && coords.first() == coords.last() {
                coords.pop();
            }
            if coords.len() < 3 {
                return None;
            }
            ShapeGeometry::Polygon(coords)
        } else {
            return None;
        };

        let mut extended = Map::new();
        for (key, value) in self.extended {
            extended.insert(key, Value::String(value));
        }

        Some(ImportedFeature {
            name: self
                .name
                .unwrap_or_else(|| format!("Feature {}", index + 1)),
            description: self.description.unwrap_or_default(),
            geometry,
            extended,
        })
    }
}

/// Parse coordinate text (`lon,lat[,alt]` tuples separated by whitespace).
///
/// Malformed tuples are skipped rather than failing the placemark.
fn parse_coordinates(text: &str) -> Vec<LatLng> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let mut parts = tuple.split(',');
            let lon: f64 = parts.next()?.parse().ok()?;
            let lat: f64 = parts.next()?.parse().ok()?;
            if lon.is_nan() || lat.is_nan() {
                return None;
            }
            Some(LatLng::new(lat, lon))
        })
        .collect()
}

/// Parse a KML document into annotation features.
pub fn parse_kml(kml: &str) -> Result<KmlImport, KmlError> {
    let mut reader = Reader::from_str(kml);
    reader.config_mut().check_end_names = true;
    let mut path: Vec<String> = Vec::new();
    let mut draft: Option<PlacemarkDraft> = None;
    let mut data_name: Option<String> = None;
    let mut import = KmlImport::default();
    let mut placemark_index = 0;

    loop {
        match reader.read_event() {
            Err(e) => return Err(KmlError::InvalidKml(format!("XML parse error: {}", e))),
            Ok(Event::Eof) => break,

            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
                if name == "Placemark" {
                    draft = Some(PlacemarkDraft::default());
                }
                if name == "Data" {
                    data_name = start
                        .attributes()
                        .flatten()
                        .find(|a| a.key.local_name().as_ref() == b"name")
                        .map(|a| String::from_utf8_lossy(&a.value).to_string());
                }
                path.push(name);
            }

            Ok(Event::End(_)) => {
                let closed = path.pop();
                if closed.as_deref() == Some("Placemark") {
                    if let Some(done) = draft.take() {
                        match done.into_feature(placemark_index) {
                            Some(feature) => import.features.push(feature),
                            None => {
                                warn!(index = placemark_index, "Skipping unparseable placemark");
                                import.skipped += 1;
                            }
                        }
                        placemark_index += 1;
                    }
                }
                if closed.as_deref() == Some("Data") {
                    data_name = None;
                }
            }

            Ok(Event::Text(text)) => {
                let Some(current) = draft.as_mut() else {
                    continue;
                };
                let content = match text.unescape() {
                    Ok(c) => c.trim().to_string(),
                    Err(_) => continue,
                };
                if content.is_empty() {
                    continue;
                }

                match element_context(&path) {
                    ElementContext::Name => append(&mut current.name, &content),
                    ElementContext::Description => append(&mut current.description, &content),
                    ElementContext::PointCoordinates => append(&mut current.point, &content),
                    ElementContext::LineCoordinates => append(&mut current.line, &content),
                    ElementContext::PolygonCoordinates => append(&mut current.polygon, &content),
                    ElementContext::DataValue => {
                        if let Some(key) = &data_name {
                            current.extended.push((key.clone(), content));
                        }
                    }
                    ElementContext::Other => {}
                }
            }

            Ok(_) => {}
        }
    }

    info!(
        features = import.features.len(),
        skipped = import.skipped,
        "KML parsed"
    );
    Ok(import)
}

fn append(slot: &mut Option<String>, content: &str) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(content);
        }
        None => *slot = Some(content.to_string()),
    }
}

enum ElementContext {
    Name,
    Description,
    PointCoordinates,
    LineCoordinates,
    PolygonCoordinates,
    DataValue,
    Other,
}

/// Classify the element the parser is currently inside, relative to the
/// enclosing Placemark.
fn element_context(path: &[String]) -> ElementContext {
    let in_placemark = path.iter().any(|p| p == "Placemark");
    if !in_placemark {
        return ElementContext::Other;
    }
    let Some(current) = path.last() else {
        return ElementContext::Other;
    };

    match current.as_str() {
        "name" => ElementContext::Name,
        "description" => ElementContext::Description,
        "value" if path.iter().any(|p| p == "ExtendedData") => ElementContext::DataValue,
        "coordinates" => {
            if path.iter().any(|p| p == "Point") {
                ElementContext::PointCoordinates
            } else if path.iter().any(|p| p == "LineString") {
                ElementContext::LineCoordinates
            } else if path.iter().any(|p| p == "outerBoundaryIs")
                && path.iter().any(|p| p == "LinearRing")
            {
                ElementContext::PolygonCoordinates
            } else {
                ElementContext::Other
            }
        }
        _ => ElementContext::Other,
    }
}

/// Extract and parse the KML inside a KMZ archive.
///
/// The first `.kml` entry found is used.
pub fn parse_kmz(bytes: &[u8]) -> Result<KmlImport, KmlError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| KmlError::InvalidKml(format!("Not a KMZ archive: {}", e)))?;

    let kml_index = (0..archive.len()).find(|i| {
        archive
            .by_index(*i)
            .map(|entry| entry.name().to_lowercase().ends_with(".kml"))
            .unwrap_or(false)
    });

    let Some(index) = kml_index else {
        return Err(KmlError::NoKmlInArchive);
    };

    let mut entry = archive
        .by_index(index)
        .map_err(|e| KmlError::InvalidKml(format!("Corrupt KMZ entry: {}", e)))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| KmlError::InvalidKml(format!("Failed to read KMZ entry: {}", e)))?;

    parse_kml(&content)
}
