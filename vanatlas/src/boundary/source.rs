//! Boundary data sources.
//!
//! Two sources exist: the remote shapefile repository serving national and
//! per-state GeoJSON files, and the application's own static data directory
//! holding the village and CFR-potential files for the states that ship
//! them. [`CompositeBoundarySource`] routes keys to the right one and
//! applies the availability gate.

use geojson::{FeatureCollection, GeoJson};
use std::future::Future;
use std::path::PathBuf;
use tracing::{info, warn};

use super::http::AsyncHttpClient;
use super::types::{BoundaryError, BoundaryKey};
use crate::region::{self, boundary_file_stem, state_folder};

/// Trait for boundary dataset sources.
pub trait BoundarySource: Send + Sync {
    /// Fetches the FeatureCollection for a key.
    fn fetch(
        &self,
        key: &BoundaryKey,
    ) -> impl Future<Output = Result<FeatureCollection, BoundaryError>> + Send;

    /// Returns the source's name for logging and identification.
    fn name(&self) -> &str;
}

/// Parse and validate a GeoJSON payload.
///
/// Anything other than a FeatureCollection is rejected, matching the wire
/// contract of the boundary host.
pub fn parse_feature_collection(bytes: &[u8]) -> Result<FeatureCollection, BoundaryError> {
    let geojson: GeoJson = serde_json::from_slice(bytes)
        .map_err(|e| BoundaryError::InvalidPayload(format!("GeoJSON parse error: {}", e)))?;

    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Geometry(_) => Err(BoundaryError::InvalidPayload(
            "Expected FeatureCollection, got Geometry".to_string(),
        )),
        GeoJson::Feature(_) => Err(BoundaryError::InvalidPayload(
            "Expected FeatureCollection, got Feature".to_string(),
        )),
    }
}

/// Remote boundary source backed by the upstream shapefile repository.
pub struct RemoteBoundarySource<C: AsyncHttpClient> {
    base_url: String,
    client: C,
}

impl<C: AsyncHttpClient> RemoteBoundarySource<C> {
    /// Create a source against a base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Build the URL for a key.
    ///
    /// Folder names may contain spaces upstream; they are percent-encoded
    /// here. Returns an error for keys served from static assets.
    pub fn url_for(&self, key: &BoundaryKey) -> Result<String, BoundaryError> {
        match key {
            BoundaryKey::States => Ok(format!("{}/INDIA/INDIA_STATES.geojson", self.base_url)),
            BoundaryKey::Districts { state }
            | BoundaryKey::Subdistricts { state }
            | BoundaryKey::Villages { state } => {
                let level = match key {
                    BoundaryKey::Districts { .. } => crate::region::AdminLevel::District,
                    BoundaryKey::Subdistricts { .. } => crate::region::AdminLevel::Subdistrict,
                    _ => crate::region::AdminLevel::Village,
                };
                let folder = state_folder(state);
                let stem = boundary_file_stem(state, level).ok_or_else(|| {
                    BoundaryError::InvalidPayload(format!("No upstream file for {}", key))
                })?;
                Ok(format!(
                    "{}/STATES/{}/{}.geojson",
                    self.base_url,
                    encode_path_segment(&folder),
                    encode_path_segment(&stem)
                ))
            }
            BoundaryKey::CfrPotential { .. } => Err(BoundaryError::InvalidPayload(format!(
                "{} is served from static assets, not the remote host",
                key
            ))),
        }
    }
}

fn encode_path_segment(segment: &str) -> String {
    segment.replace(' ', "%20")
}

impl<C: AsyncHttpClient> BoundarySource for RemoteBoundarySource<C> {
    async fn fetch(&self, key: &BoundaryKey) -> Result<FeatureCollection, BoundaryError> {
        let url = self.url_for(key)?;
        info!(key = %key, url = url, "Fetching boundary data");
        let bytes = self.client.get(&url).await?;
        let collection = parse_feature_collection(&bytes)?;
        info!(
            key = %key,
            features = collection.features.len(),
            "Boundary data loaded"
        );
        Ok(collection)
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Static boundary source serving files from the application data directory.
///
/// Village and CFR-potential layers ship with the application as
/// `{state}_villages.geojson` and `{state}_cfr_potential.geojson`.
pub struct StaticBoundarySource {
    data_dir: PathBuf,
}

impl StaticBoundarySource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The on-disk path for a key, if the key is served statically.
    pub fn path_for(&self, key: &BoundaryKey) -> Option<PathBuf> {
        let (state, suffix) = match key {
            BoundaryKey::Villages { state } => (state, "villages"),
            BoundaryKey::CfrPotential { state } => (state, "cfr_potential"),
            _ => return None,
        };
        let file = format!("{}_{}.geojson", state.as_str().to_lowercase(), suffix);
        Some(self.data_dir.join(file))
    }
}

impl BoundarySource for StaticBoundarySource {
    async fn fetch(&self, key: &BoundaryKey) -> Result<FeatureCollection, BoundaryError> {
        let path = self.path_for(key).ok_or_else(|| {
            BoundaryError::InvalidPayload(format!("{} is not a static layer", key))
        })?;
        info!(key = %key, path = %path.display(), "Reading static boundary file");
        let bytes = tokio::fs::read(&path).await?;
        parse_feature_collection(&bytes)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Routes keys between the remote host and the static data directory, and
/// rejects layers a state does not ship before any I/O happens.
pub struct CompositeBoundarySource<C: AsyncHttpClient> {
    remote: RemoteBoundarySource<C>,
    local: StaticBoundarySource,
}

impl<C: AsyncHttpClient> CompositeBoundarySource<C> {
    pub fn new(remote: RemoteBoundarySource<C>, local: StaticBoundarySource) -> Self {
        Self { remote, local }
    }
}

impl<C: AsyncHttpClient> BoundarySource for CompositeBoundarySource<C> {
    async fn fetch(&self, key: &BoundaryKey) -> Result<FeatureCollection, BoundaryError> {
        match key {
            BoundaryKey::Villages { state } => {
                if !region::has_village_data(state) {
                    warn!(state = %state, "Village data requested for unsupported state");
                    return Err(BoundaryError::NotAvailable {
                        layer: "Village".to_string(),
                        state: state.to_string(),
                    });
                }
                self.local.fetch(key).await
            }
            BoundaryKey::CfrPotential { state } => {
                if !region::has_cfr_potential(state) {
                    warn!(state = %state, "CFR overlay requested for unsupported state");
                    return Err(BoundaryError::NotAvailable {
                        layer: "CFR potential".to_string(),
                        state: state.to_string(),
                    });
                }
                self.local.fetch(key).await
            }
            _ => self.remote.fetch(key).await,
        }
    }

    fn name(&self) -> &str {
        "composite"
    }
}
