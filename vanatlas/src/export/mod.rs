//! Export adapters: boundary GeoJSON, shape KML, and PNG screenshots.

mod boundary;
mod screenshot;
mod shapes;

pub use boundary::{
    boundary_export_json, current_boundary_export, write_boundary_file, BoundaryExport,
};
pub use screenshot::{render_screenshot, MapStyle, ScreenshotConfig};
pub use shapes::{shapes_to_feature_collection, write_shapes_kml};

use thiserror::Error;

/// Errors from export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The current view or collection has nothing to export.
    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    /// Writing the output file failed.
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// KML serialization failed.
    #[error(transparent)]
    Kml(#[from] crate::kml::KmlError),

    /// JSON serialization failed.
    #[error("Export serialization error: {0}")]
    Serialize(String),

    /// Map rendering failed.
    #[error("Screenshot rendering failed: {0}")]
    Render(String),
}
