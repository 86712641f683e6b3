//! Engine configuration.

use crate::geom::LatLng;
use std::path::PathBuf;

/// Default boundary repository base URL.
pub const DEFAULT_BOUNDARY_BASE_URL: &str =
    "https://raw.githubusercontent.com/datta07/INDIAN-SHAPEFILES/master";

/// Default claims API base URL.
pub const DEFAULT_CLAIMS_API_URL: &str = "http://localhost:8000";

/// Initial map view: center of India at country zoom.
pub const INDIA_CENTER: LatLng = LatLng {
    lat: 20.5937,
    lon: 78.9629,
};
pub const INDIA_ZOOM: u8 = 5;

/// Complete engine configuration.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Base URL of the remote boundary repository.
    pub boundary_base_url: String,
    /// Directory holding static boundary files (villages, CFR overlay).
    pub data_dir: PathBuf,
    /// Base URL of the claims REST API.
    pub claims_api_url: String,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Directory where exports are written.
    pub export_dir: PathBuf,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            boundary_base_url: DEFAULT_BOUNDARY_BASE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            claims_api_url: DEFAULT_CLAIMS_API_URL.to_string(),
            http_timeout_secs: 30,
            export_dir: PathBuf::from("."),
        }
    }
}

impl AtlasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the boundary repository base URL.
    pub fn with_boundary_base_url(mut self, url: impl Into<String>) -> Self {
        self.boundary_base_url = url.into();
        self
    }

    /// Set the static data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the claims API base URL.
    pub fn with_claims_api_url(mut self, url: impl Into<String>) -> Self {
        self.claims_api_url = url.into();
        self
    }

    /// Set the HTTP timeout in seconds.
    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    /// Set the export output directory.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }
}
