//! Service-level error type.

use thiserror::Error;

use crate::boundary::BoundaryError;
use crate::draw::DrawError;
use crate::export::ExportError;
use crate::kml::KmlError;

/// Errors surfaced by [`AtlasService`](super::AtlasService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Boundary fetch or cache failure.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// Drawing-session failure.
    #[error(transparent)]
    Draw(#[from] DrawError),

    /// Export failure.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// KML import/export failure.
    #[error(transparent)]
    Kml(#[from] KmlError),

    /// The navigation context changed while the request was in flight; the
    /// result was discarded.
    #[error("Navigation changed while the request was in flight")]
    Superseded,

    /// A searched region was not found in the loaded data.
    #[error("{0}")]
    NotFound(String),
}
