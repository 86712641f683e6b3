//! KML/KMZ interchange.
//!
//! The reader turns Placemarks into annotation shapes; the writer renders
//! GeoJSON features as KML 2.2 for download. Per-placemark failures are
//! skipped, whole-document failures are errors.

mod reader;
mod writer;

pub use reader::{parse_kml, parse_kmz, ImportedFeature, KmlImport};
pub use writer::write_kml;

use thiserror::Error;

/// Errors from KML/KMZ processing.
#[derive(Debug, Error)]
pub enum KmlError {
    /// The document (or archive) could not be parsed at all.
    #[error("Invalid KML: {0}")]
    InvalidKml(String),

    /// A KMZ archive contained no `.kml` entry.
    #[error("No KML file found in KMZ archive")]
    NoKmlInArchive,

    /// The file could not be read.
    #[error("KML I/O error: {0}")]
    Io(#[from] std::io::Error),
}
