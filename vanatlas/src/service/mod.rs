//! High-level service facade and the user-alert seam.

mod error;
mod facade;
mod notify;

pub use error::ServiceError;
pub use facade::{AtlasService, DefaultAtlasService, ImportSummary};
pub use notify::{BufferedNotifier, Notifier, TracingNotifier};
