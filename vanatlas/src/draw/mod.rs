//! Drawing and annotation: shape types, the interactive drawing session,
//! and the session's shape collection.

mod collection;
mod session;
mod types;

pub use collection::ShapeCollection;
pub use session::{DrawError, DrawingSession, PreviewFrame};
pub use types::{
    DrawnShape, ImportedFileSet, Measurements, ShapeGeometry, ShapeId, ShapeKind, ShapeSource,
};
