//! High-level engine facade.
//!
//! [`AtlasService`] wires the configuration, boundary cache and sources, the
//! navigation machine, the drawing session, and the export adapters behind
//! one API. Every user action maps to one method; every caught error is
//! logged and surfaced through the [`Notifier`] seam, and nothing retries
//! automatically.

use geojson::FeatureCollection;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::error::ServiceError;
use super::notify::{Notifier, TracingNotifier};
use crate::boundary::{
    BoundaryCache, BoundaryKey, BoundarySource, CacheStats, CompositeBoundarySource,
    RemoteBoundarySource, ReqwestClient, StaticBoundarySource,
};
use crate::config::AtlasConfig;
use crate::draw::{
    DrawingSession, DrawnShape, ImportedFileSet, PreviewFrame, ShapeCollection, ShapeId, ShapeKind,
};
use crate::export::{render_screenshot, write_boundary_file, write_shapes_kml, ScreenshotConfig};
use crate::geom::LatLng;
use crate::kml::{parse_kml, parse_kmz, KmlError};
use crate::nav::{NavEvent, NavState, Navigator, RenderedLayer};
use crate::region::{self, AdminLevel, PropertySchema, RegionName};

/// Result of a multi-file KML/KMZ import.
///
/// Per-file failures do not abort the batch; they are collected here after
/// being surfaced through the notifier.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub files_imported: usize,
    pub features_imported: usize,
    pub placemarks_skipped: usize,
    pub failures: Vec<(String, String)>,
}

/// The engine facade.
pub struct AtlasService<S: BoundarySource> {
    config: AtlasConfig,
    source: S,
    cache: BoundaryCache,
    navigator: Mutex<Navigator>,
    session: Mutex<DrawingSession>,
    shapes: Mutex<ShapeCollection>,
    notifier: Arc<dyn Notifier>,
}

/// Service over the default production source stack.
pub type DefaultAtlasService = AtlasService<CompositeBoundarySource<ReqwestClient>>;

impl DefaultAtlasService {
    /// Create a service wired to the remote boundary host and the local
    /// static data directory from `config`.
    pub fn new(config: AtlasConfig) -> Result<Self, ServiceError> {
        let client = ReqwestClient::with_timeout(config.http_timeout_secs)?;
        let remote = RemoteBoundarySource::new(config.boundary_base_url.clone(), client);
        let local = StaticBoundarySource::new(config.data_dir.clone());
        let source = CompositeBoundarySource::new(remote, local);
        Ok(Self::with_source(config, source, Arc::new(TracingNotifier)))
    }
}

impl<S: BoundarySource> AtlasService<S> {
    /// Create a service over an explicit source and notifier.
    pub fn with_source(config: AtlasConfig, source: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            source,
            cache: BoundaryCache::new(),
            navigator: Mutex::new(Navigator::new()),
            session: Mutex::new(DrawingSession::new()),
            shapes: Mutex::new(ShapeCollection::new()),
            notifier,
        }
    }

    fn nav(&self) -> MutexGuard<'_, Navigator> {
        self.navigator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn drawing(&self) -> MutexGuard<'_, DrawingSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn collection(&self) -> MutexGuard<'_, ShapeCollection> {
        self.shapes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current navigation state.
    pub fn nav_state(&self) -> NavState {
        self.nav().state().clone()
    }

    /// Boundary cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The boundary cache (read access for exports and tests).
    pub fn boundary_cache(&self) -> &BoundaryCache {
        &self.cache
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Toggle boundary display.
    ///
    /// Turning boundaries on loads and renders the national states layer;
    /// turning them off clears every selector and layer. Turning them back
    /// on does not restore the previous selection.
    pub async fn set_boundaries_enabled(&self, enabled: bool) -> Result<NavState, ServiceError> {
        let (epoch, token) = {
            let mut nav = self.nav();
            nav.apply(NavEvent::BoundariesToggled(enabled));
            (nav.epoch(), nav.cancellation_token())
        };

        if !enabled {
            return Ok(self.nav_state());
        }

        let fetched = tokio::select! {
            _ = token.cancelled() => return Err(ServiceError::Superseded),
            result = self.cache.get_or_fetch(&BoundaryKey::States, &self.source) => result,
        };

        match fetched {
            Ok(data) => {
                let mut nav = self.nav();
                if nav.is_current(epoch) {
                    nav.apply(NavEvent::ChildLayerLoaded {
                        layer: RenderedLayer {
                            key: BoundaryKey::States,
                            features: data.features.len(),
                        },
                        level: AdminLevel::State,
                    });
                }
                Ok(nav.state().clone())
            }
            Err(e) => {
                self.notifier.alert(
                    "Failed to load state boundaries. Please check your network or try again later.",
                );
                Err(e.into())
            }
        }
    }

    /// Apply a click on a rendered region polygon.
    ///
    /// The region's child boundary data is fetched first; only a successful
    /// load advances the machine. A click whose ancestors are not selected,
    /// or while boundaries are disabled, is ignored.
    pub async fn select_region(
        &self,
        level: AdminLevel,
        name: &str,
    ) -> Result<NavState, ServiceError> {
        let (epoch, token, selected_state) = {
            let nav = self.nav();
            let state = nav.state();
            if !state.boundaries_enabled {
                debug!(name = name, "Click ignored: boundaries disabled");
                return Ok(state.clone());
            }
            if !state.selection.ancestors_selected(level) {
                debug!(level = %level, name = name, "Click ignored: ancestors not selected");
                return Ok(state.clone());
            }
            (
                nav.epoch(),
                nav.cancellation_token(),
                state.selection.state.clone(),
            )
        };

        // The dataset that must resolve before this click applies.
        let child = match level {
            AdminLevel::State => Some((BoundaryKey::districts(name), AdminLevel::District)),
            AdminLevel::District => selected_state
                .as_deref()
                .map(|s| (BoundaryKey::subdistricts(s), AdminLevel::Subdistrict)),
            AdminLevel::Subdistrict => selected_state.as_deref().and_then(|s| {
                region::has_village_data(&RegionName::normalize(s))
                    .then(|| (BoundaryKey::villages(s), AdminLevel::Village))
            }),
            AdminLevel::Village | AdminLevel::Country => None,
        };

        let loaded = match child {
            Some((key, child_level)) => {
                let fetched = tokio::select! {
                    _ = token.cancelled() => return Err(ServiceError::Superseded),
                    result = self.cache.get_or_fetch(&key, &self.source) => result,
                };
                match fetched {
                    Ok(data) => Some((key, child_level, data)),
                    Err(e) => {
                        self.notifier.alert(&format!(
                            "Failed to load {}s for {}. {}",
                            child_level, name, e
                        ));
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        let mut nav = self.nav();
        if !nav.is_current(epoch) {
            debug!(name = name, "Discarding click: navigation superseded");
            return Err(ServiceError::Superseded);
        }

        nav.apply(NavEvent::RegionClicked {
            level,
            name: name.to_string(),
        });

        if let Some((key, child_level, data)) = loaded {
            let features = filtered_feature_count(child_level, &data, nav.state());
            if features == 0 {
                warn!(level = %child_level, name = name, "No child features for selection");
            } else {
                nav.apply(NavEvent::ChildLayerLoaded {
                    layer: RenderedLayer { key, features },
                    level: child_level,
                });
            }
        }

        info!(level = %level, name = name, "Region selected");
        Ok(nav.state().clone())
    }

    /// Reset to the country view, clearing all selections and layers.
    pub fn reset_to_country(&self) -> NavState {
        let mut nav = self.nav();
        nav.apply(NavEvent::ResetToCountry);
        info!("Reset to country view");
        nav.state().clone()
    }

    /// Apply a combo-search selection, bypassing the click chain.
    ///
    /// Renders a single highlighted result layer; search mode is left only
    /// via [`reset_to_country`](Self::reset_to_country) or a subsequent
    /// region click.
    pub async fn search(
        &self,
        state: &str,
        district: Option<&str>,
        subdistrict: Option<&str>,
    ) -> Result<NavState, ServiceError> {
        let (epoch, token) = {
            let nav = self.nav();
            (nav.epoch(), nav.cancellation_token())
        };

        let (key, schema, target, parent_district) = match (district, subdistrict) {
            (Some(d), Some(sd)) => (
                BoundaryKey::subdistricts(state),
                PropertySchema::Subdistricts,
                sd,
                Some(d),
            ),
            (Some(d), None) => (
                BoundaryKey::districts(state),
                PropertySchema::Districts,
                d,
                None,
            ),
            (None, Some(_)) => {
                return Err(ServiceError::NotFound(
                    "A subdistrict search needs its district".to_string(),
                ))
            }
            (None, None) => (BoundaryKey::States, PropertySchema::States, state, None),
        };

        let fetched = tokio::select! {
            _ = token.cancelled() => return Err(ServiceError::Superseded),
            result = self.cache.get_or_fetch(&key, &self.source) => result,
        };
        let data = match fetched {
            Ok(data) => data,
            Err(e) => {
                self.notifier
                    .alert(&format!("Failed to search location. {}", e));
                return Err(e.into());
            }
        };

        let found = data.features.iter().any(|f| {
            let name_matches = schema
                .region_name(f)
                .map(|n| eq_fold(n, target))
                .unwrap_or(false);
            let district_matches = parent_district
                .map(|d| {
                    schema
                        .parent_district(f)
                        .map(|pd| eq_fold(pd, d))
                        .unwrap_or(false)
                })
                .unwrap_or(true);
            name_matches && district_matches
        });

        if !found {
            let message = format!("\"{}\" not found", target);
            self.notifier.alert(&message);
            return Err(ServiceError::NotFound(message));
        }

        let mut nav = self.nav();
        if !nav.is_current(epoch) {
            return Err(ServiceError::Superseded);
        }
        nav.apply(NavEvent::SearchApplied {
            layer: RenderedLayer { key, features: 1 },
        });
        info!(target = target, "Search applied");
        Ok(nav.state().clone())
    }

    /// District display names of a state, for the search combo.
    pub async fn district_names(&self, state: &str) -> Result<Vec<String>, ServiceError> {
        let data = match self
            .cache
            .get_or_fetch(&BoundaryKey::districts(state), &self.source)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                self.notifier.alert(&format!(
                    "Failed to load districts for {}. Please try again.",
                    state
                ));
                return Err(e.into());
            }
        };

        let schema = PropertySchema::Districts;
        let mut names: Vec<String> = data
            .features
            .iter()
            .filter_map(|f| schema.region_name(f))
            .map(String::from)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Subdistrict display names of one district, for the search combo.
    pub async fn subdistrict_names(
        &self,
        state: &str,
        district: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let data = match self
            .cache
            .get_or_fetch(&BoundaryKey::subdistricts(state), &self.source)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                self.notifier.alert(&format!(
                    "Failed to load subdistricts for {}. Subdistrict data may not be available.",
                    state
                ));
                return Err(e.into());
            }
        };

        let schema = PropertySchema::Subdistricts;
        let mut names: Vec<String> = data
            .features
            .iter()
            .filter(|f| {
                schema
                    .parent_district(f)
                    .map(|d| eq_fold(d, district))
                    .unwrap_or(false)
            })
            .filter_map(|f| schema.region_name(f))
            .map(String::from)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Load a boundary dataset through the cache.
    ///
    /// Embedders use this to obtain the FeatureCollection behind a rendered
    /// layer. Fetch failures are surfaced via the notifier.
    pub async fn load_boundary(
        &self,
        key: &BoundaryKey,
    ) -> Result<Arc<FeatureCollection>, ServiceError> {
        match self.cache.get_or_fetch(key, &self.source).await {
            Ok(data) => Ok(data),
            Err(e) => {
                self.notifier
                    .alert(&format!("Failed to load boundary data for {}. {}", key, e));
                Err(e.into())
            }
        }
    }

    /// Load a state's village layer (availability-gated).
    pub async fn load_village_layer(
        &self,
        state: &str,
    ) -> Result<Arc<FeatureCollection>, ServiceError> {
        match self
            .cache
            .get_or_fetch(&BoundaryKey::villages(state), &self.source)
            .await
        {
            Ok(data) => Ok(data),
            Err(e) => {
                self.notifier
                    .alert(&format!("Failed to load villages for {}. {}", state, e));
                Err(e.into())
            }
        }
    }

    /// Load a state's CFR-potential overlay (availability-gated).
    pub async fn load_cfr_overlay(
        &self,
        state: &str,
    ) -> Result<Arc<FeatureCollection>, ServiceError> {
        match self
            .cache
            .get_or_fetch(&BoundaryKey::cfr_potential(state), &self.source)
            .await
        {
            Ok(data) => Ok(data),
            Err(e) => {
                self.notifier
                    .alert(&format!("Failed to load CFR potential for {}. {}", state, e));
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Begin drawing a shape, cancelling any drawing in progress.
    pub fn start_drawing(&self, kind: ShapeKind) {
        self.drawing().start(kind);
    }

    /// Place a vertex at the cursor.
    pub fn add_vertex(&self, point: LatLng) -> Result<(), ServiceError> {
        Ok(self.drawing().add_vertex(point)?)
    }

    /// Set the radius of an in-progress circle.
    pub fn set_circle_radius(&self, meters: f64) -> Result<(), ServiceError> {
        Ok(self.drawing().set_radius(meters)?)
    }

    /// Live preview for the current cursor position.
    pub fn preview(&self, cursor: LatLng) -> Option<PreviewFrame> {
        self.drawing().preview(cursor)
    }

    /// Complete the drawing and append the measured shape to the
    /// collection.
    pub fn complete_drawing(&self) -> Result<DrawnShape, ServiceError> {
        let shape = self.drawing().complete()?;
        self.collection().add(shape.clone());
        Ok(shape)
    }

    /// Discard the in-progress drawing.
    pub fn cancel_drawing(&self) {
        self.drawing().cancel();
    }

    /// Whether a drawing is active.
    pub fn is_drawing(&self) -> bool {
        self.drawing().is_drawing()
    }

    /// Remove a single shape.
    pub fn remove_shape(&self, id: ShapeId) -> bool {
        self.collection().remove(id).is_some()
    }

    /// Remove all shapes and import records.
    pub fn clear_shapes(&self) {
        self.collection().clear();
    }

    /// Snapshot of all shapes, in insertion order.
    pub fn shapes(&self) -> Vec<DrawnShape> {
        self.collection().iter().cloned().collect()
    }

    pub fn shape_count(&self) -> usize {
        self.collection().len()
    }

    /// Shapes grouped by kind for display.
    pub fn shapes_grouped(&self) -> BTreeMap<ShapeKind, Vec<DrawnShape>> {
        self.collection()
            .grouped_by_kind()
            .into_iter()
            .map(|(kind, shapes)| (kind, shapes.into_iter().cloned().collect()))
            .collect()
    }

    /// Import records, one per file.
    pub fn imports(&self) -> Vec<ImportedFileSet> {
        self.collection().imports().to_vec()
    }

    /// Remove every shape that came from one imported file.
    pub fn remove_import(&self, file_name: &str) -> usize {
        self.collection().remove_import(file_name)
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Import KML/KMZ files into the shape collection.
    ///
    /// Each file is processed independently: a failure is surfaced via the
    /// notifier and recorded in the summary, and the batch continues.
    pub fn import_kml_files(&self, paths: &[PathBuf]) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            match self.import_one(path, &file_name) {
                Ok((features, skipped)) => {
                    summary.files_imported += 1;
                    summary.features_imported += features;
                    summary.placemarks_skipped += skipped;
                }
                Err(e) => {
                    self.notifier
                        .alert(&format!("Error importing {}: {}", file_name, e));
                    summary.failures.push((file_name, e.to_string()));
                }
            }
        }

        info!(
            files = summary.files_imported,
            features = summary.features_imported,
            failures = summary.failures.len(),
            "KML import finished"
        );
        summary
    }

    fn import_one(&self, path: &Path, file_name: &str) -> Result<(usize, usize), ServiceError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let import = match extension.as_str() {
            "kml" => {
                let content = std::fs::read_to_string(path).map_err(KmlError::Io)?;
                parse_kml(&content)?
            }
            "kmz" => {
                let bytes = std::fs::read(path).map_err(KmlError::Io)?;
                parse_kmz(&bytes)?
            }
            _ => {
                return Err(KmlError::InvalidKml(format!(
                    "{} is not a supported file type. Please upload KML files.",
                    file_name
                ))
                .into())
            }
        };

        if import.features.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No valid features found in {}",
                file_name
            )));
        }

        let shapes: Vec<DrawnShape> = import
            .features
            .into_iter()
            .map(|f| f.into_shape(file_name))
            .collect();
        let count = shapes.len();
        self.collection().add_imported(file_name, shapes);
        Ok((count, import.skipped))
    }

    /// Export the current boundary view as GeoJSON.
    pub fn export_boundary(&self) -> Result<PathBuf, ServiceError> {
        let state = self.nav_state();
        write_boundary_file(&self.config.export_dir, &state, &self.cache).map_err(|e| {
            self.notifier.alert("Error exporting boundary data");
            e.into()
        })
    }

    /// Export the shape collection as KML.
    pub fn export_shapes(&self) -> Result<PathBuf, ServiceError> {
        let collection = self.collection();
        write_shapes_kml(&self.config.export_dir, &collection).map_err(|e| {
            self.notifier.alert("Error exporting drawn shapes");
            e.into()
        })
    }

    /// Render the current view to a PNG screenshot.
    pub fn export_screenshot(&self, config: &ScreenshotConfig) -> Result<PathBuf, ServiceError> {
        let state = self.nav_state();

        let mut collections: Vec<Arc<FeatureCollection>> = Vec::new();
        for level in state.rendered.rendered_levels() {
            if let Some(layer) = state.rendered.at(level) {
                if let Some(data) = self.cache.get(&layer.key) {
                    collections.push(data);
                }
            }
        }
        if let Some(search) = state.rendered.search() {
            if let Some(data) = self.cache.get(&search.key) {
                collections.push(data);
            }
        }

        let shapes = self.shapes();
        let path = self.config.export_dir.join(format!(
            "map-screenshot-{}.png",
            chrono::Utc::now().timestamp_millis()
        ));

        let boundary_refs: Vec<&FeatureCollection> =
            collections.iter().map(|c| c.as_ref()).collect();
        let shape_refs: Vec<&DrawnShape> = shapes.iter().collect();

        render_screenshot(&boundary_refs, &shape_refs, config, &path).map_err(|e| {
            self.notifier
                .alert(&format!("Error capturing map screenshot: {}", e));
            ServiceError::from(e)
        })?;
        Ok(path)
    }
}

/// Case-insensitive, whitespace-trimmed name comparison.
fn eq_fold(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Number of features the child layer will render for the current
/// selection.
///
/// Subdistrict layers show only the selected district's subdistricts;
/// village layers narrow by subdistrict (or district) where the dataset
/// carries those properties.
fn filtered_feature_count(
    level: AdminLevel,
    data: &FeatureCollection,
    state: &NavState,
) -> usize {
    match level {
        AdminLevel::Subdistrict => {
            let Some(district) = state.selection.district.as_deref() else {
                return data.features.len();
            };
            let schema = PropertySchema::Subdistricts;
            data.features
                .iter()
                .filter(|f| {
                    schema
                        .parent_district(f)
                        .map(|d| eq_fold(d, district))
                        .unwrap_or(false)
                })
                .count()
        }
        AdminLevel::Village => {
            let schema = PropertySchema::Villages;
            if let Some(subdistrict) = state.selection.subdistrict.as_deref() {
                let narrowed = data
                    .features
                    .iter()
                    .filter(|f| {
                        schema
                            .parent_subdistrict(f)
                            .map(|sd| eq_fold(sd, subdistrict))
                            .unwrap_or(false)
                    })
                    .count();
                if narrowed > 0 {
                    return narrowed;
                }
            }
            if let Some(district) = state.selection.district.as_deref() {
                let narrowed = data
                    .features
                    .iter()
                    .filter(|f| {
                        schema
                            .parent_district(f)
                            .map(|d| eq_fold(d, district))
                            .unwrap_or(false)
                    })
                    .count();
                if narrowed > 0 {
                    return narrowed;
                }
            }
            data.features.len()
        }
        _ => data.features.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{parse_feature_collection, BoundaryError};
    use crate::draw::ShapeGeometry;
    use crate::nav::NavLevel;
    use crate::service::notify::BufferedNotifier;
    use std::collections::HashMap;

    struct CannedSource {
        data: HashMap<BoundaryKey, FeatureCollection>,
    }

    impl CannedSource {
        fn new() -> Self {
            Self {
                data: HashMap::new(),
            }
        }

        fn with(mut self, key: BoundaryKey, json: &str) -> Self {
            self.data
                .insert(key, parse_feature_collection(json.as_bytes()).unwrap());
            self
        }
    }

    impl BoundarySource for CannedSource {
        async fn fetch(&self, key: &BoundaryKey) -> Result<FeatureCollection, BoundaryError> {
            self.data
                .get(key)
                .cloned()
                .ok_or_else(|| BoundaryError::Http(format!("HTTP 404 for {}", key)))
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    const STATES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"STNAME":"Odisha"},
         "geometry":{"type":"Polygon","coordinates":[[[85.0,20.0],[86.0,20.0],[86.0,21.0],[85.0,20.0]]]}},
        {"type":"Feature","properties":{"STNAME":"Kerala"},
         "geometry":{"type":"Polygon","coordinates":[[[76.0,10.0],[77.0,10.0],[77.0,11.0],[76.0,10.0]]]}}
    ]}"#;

    const ODISHA_DISTRICTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"dtname":"Mayurbhanj"},
         "geometry":{"type":"Polygon","coordinates":[[[86.0,21.0],[87.0,21.0],[87.0,22.0],[86.0,21.0]]]}},
        {"type":"Feature","properties":{"dtname":"Khordha"},
         "geometry":{"type":"Polygon","coordinates":[[[85.0,20.0],[86.0,20.0],[86.0,20.5],[85.0,20.0]]]}}
    ]}"#;

    const ODISHA_SUBDISTRICTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"sdtname":"Baripada","dtname":"Mayurbhanj"},
         "geometry":{"type":"Polygon","coordinates":[[[86.0,21.0],[86.5,21.0],[86.5,21.5],[86.0,21.0]]]}},
        {"type":"Feature","properties":{"sdtname":"Udala","dtname":"Mayurbhanj"},
         "geometry":{"type":"Polygon","coordinates":[[[86.1,21.1],[86.6,21.1],[86.6,21.6],[86.1,21.1]]]}},
        {"type":"Feature","properties":{"sdtname":"Bhograi","dtname":"Balasore"},
         "geometry":{"type":"Polygon","coordinates":[[[87.0,21.0],[87.5,21.0],[87.5,21.5],[87.0,21.0]]]}}
    ]}"#;

    fn full_source() -> CannedSource {
        CannedSource::new()
            .with(BoundaryKey::States, STATES)
            .with(BoundaryKey::districts("Odisha"), ODISHA_DISTRICTS)
            .with(BoundaryKey::subdistricts("Odisha"), ODISHA_SUBDISTRICTS)
    }

    fn service_with(
        source: CannedSource,
    ) -> (AtlasService<CannedSource>, Arc<BufferedNotifier>) {
        let notifier = Arc::new(BufferedNotifier::new());
        let config = AtlasConfig::default();
        let service = AtlasService::with_source(config, source, notifier.clone());
        (service, notifier)
    }

    #[tokio::test]
    async fn test_enabling_boundaries_renders_states_layer() {
        let (service, _) = service_with(full_source());
        let state = service.set_boundaries_enabled(true).await.unwrap();

        assert!(state.boundaries_enabled);
        assert_eq!(state.level(), NavLevel::India);
        let layer = state.rendered.at(AdminLevel::State).unwrap();
        assert_eq!(layer.key, BoundaryKey::States);
        assert_eq!(layer.features, 2);
    }

    #[tokio::test]
    async fn test_enabling_boundaries_fetch_failure_alerts() {
        let (service, notifier) = service_with(CannedSource::new());
        let result = service.set_boundaries_enabled(true).await;

        assert!(result.is_err());
        let alerts = notifier.take();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("state boundaries"));
    }

    #[tokio::test]
    async fn test_state_click_fetches_districts_and_advances() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();

        let state = service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();
        assert_eq!(state.level(), NavLevel::State);
        assert_eq!(state.selection.state.as_deref(), Some("Odisha"));
        let layer = state.rendered.at(AdminLevel::District).unwrap();
        assert_eq!(layer.features, 2);
        assert_eq!(service.cache_stats().fetches, 2);
    }

    #[tokio::test]
    async fn test_failed_child_fetch_does_not_advance() {
        // Kerala districts are not in the canned data.
        let (service, notifier) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();

        let result = service.select_region(AdminLevel::State, "Kerala").await;
        assert!(result.is_err());

        let state = service.nav_state();
        assert_eq!(state.level(), NavLevel::India, "Machine must not advance");
        assert!(state.selection.state.is_none());
        assert!(!notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_district_click_filters_subdistrict_layer() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();
        service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();

        let state = service
            .select_region(AdminLevel::District, "Mayurbhanj")
            .await
            .unwrap();
        assert_eq!(state.level(), NavLevel::District);
        let layer = state.rendered.at(AdminLevel::Subdistrict).unwrap();
        assert_eq!(layer.features, 2, "Only Mayurbhanj subdistricts render");
    }

    #[tokio::test]
    async fn test_district_click_without_state_is_ignored() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();

        let state = service
            .select_region(AdminLevel::District, "Mayurbhanj")
            .await
            .unwrap();
        assert_eq!(state.level(), NavLevel::India);
        assert!(state.selection.district.is_none());
    }

    #[tokio::test]
    async fn test_click_while_disabled_is_ignored() {
        let (service, _) = service_with(full_source());
        let state = service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();
        assert!(state.selection.state.is_none());
        assert_eq!(service.cache_stats().fetches, 0, "No fetch when disabled");
    }

    #[tokio::test]
    async fn test_repeat_click_hits_cache() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();
        service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();
        service.reset_to_country();
        service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();

        let stats = service.cache_stats();
        assert_eq!(stats.fetches, 2, "states + districts fetched once each");
        assert!(stats.hits >= 1);
    }

    #[tokio::test]
    async fn test_search_bypasses_chain() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();
        service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();

        let state = service
            .search("Odisha", Some("Mayurbhanj"), Some("Udala"))
            .await
            .unwrap();
        assert_eq!(state.level(), NavLevel::Search);
        assert!(state.selection.state.is_none(), "Search clears the chain");
        assert_eq!(state.rendered.len(), 1);
        assert!(state.rendered.search().is_some());
    }

    #[tokio::test]
    async fn test_search_not_found_alerts() {
        let (service, notifier) = service_with(full_source());
        let result = service.search("Odisha", Some("Atlantis"), None).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(notifier.take()[0].contains("Atlantis"));
    }

    #[tokio::test]
    async fn test_district_names_sorted() {
        let (service, _) = service_with(full_source());
        let names = service.district_names("Odisha").await.unwrap();
        assert_eq!(names, vec!["Khordha", "Mayurbhanj"]);
    }

    #[tokio::test]
    async fn test_subdistrict_names_filtered_by_district() {
        let (service, _) = service_with(full_source());
        let names = service
            .subdistrict_names("Odisha", "Mayurbhanj")
            .await
            .unwrap();
        assert_eq!(names, vec!["Baripada", "Udala"]);
    }

    #[tokio::test]
    async fn test_village_layer_gated_for_unsupported_state() {
        let config = AtlasConfig::default();
        let notifier = Arc::new(BufferedNotifier::new());
        let client = crate::boundary::ReqwestClient::new().unwrap();
        let remote = RemoteBoundarySource::new("http://localhost:1", client);
        let local = StaticBoundarySource::new("/nonexistent");
        let service = AtlasService::with_source(
            config,
            CompositeBoundarySource::new(remote, local),
            notifier.clone(),
        );

        let result = service.load_village_layer("Kerala").await;
        assert!(matches!(
            result,
            Err(ServiceError::Boundary(BoundaryError::NotAvailable { .. }))
        ));
        assert!(notifier.take()[0].contains("not available"));
    }

    #[tokio::test]
    async fn test_drawing_flow_adds_to_collection() {
        let (service, _) = service_with(full_source());

        service.start_drawing(ShapeKind::Polyline);
        assert!(service.is_drawing());
        service.add_vertex(LatLng::new(20.0, 85.0)).unwrap();
        service.add_vertex(LatLng::new(20.5, 85.0)).unwrap();

        let preview = service.preview(LatLng::new(20.6, 85.0)).unwrap();
        assert!(preview.label.starts_with("Distance: "));

        let shape = service.complete_drawing().unwrap();
        assert_eq!(service.shape_count(), 1);
        assert!(!service.is_drawing());

        assert!(service.remove_shape(shape.id));
        assert_eq!(service.shape_count(), 0);
    }

    #[tokio::test]
    async fn test_import_batch_continues_after_failure() {
        let (service, notifier) = service_with(full_source());
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.kml");
        std::fs::write(
            &good,
            r#"<kml><Document><Placemark><name>Site</name>
               <Point><coordinates>85.8,20.3</coordinates></Point>
               </Placemark></Document></kml>"#,
        )
        .unwrap();

        let bad = dir.path().join("bad.kml");
        std::fs::write(&bad, "<kml><Placemark></Document></kml>").unwrap();

        let unsupported = dir.path().join("notes.txt");
        std::fs::write(&unsupported, "not geodata").unwrap();

        let summary =
            service.import_kml_files(&[bad.clone(), unsupported.clone(), good.clone()]);
        assert_eq!(summary.files_imported, 1);
        assert_eq!(summary.features_imported, 1);
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(service.shape_count(), 1);
        assert_eq!(notifier.take().len(), 2);
        assert_eq!(service.imports().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_import_clears_file_shapes() {
        let (service, _) = service_with(full_source());
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sites.kml");
        std::fs::write(
            &file,
            r#"<kml><Document>
               <Placemark><Point><coordinates>85.8,20.3</coordinates></Point></Placemark>
               <Placemark><Point><coordinates>85.9,20.4</coordinates></Point></Placemark>
               </Document></kml>"#,
        )
        .unwrap();

        service.import_kml_files(&[file]);
        assert_eq!(service.shape_count(), 2);

        let removed = service.remove_import("sites.kml");
        assert_eq!(removed, 2);
        assert_eq!(service.shape_count(), 0);
    }

    #[tokio::test]
    async fn test_export_boundary_via_service() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(BufferedNotifier::new());
        let config = AtlasConfig::default().with_export_dir(dir.path());
        let service = AtlasService::with_source(config, full_source(), notifier);

        service.set_boundaries_enabled(true).await.unwrap();
        let path = service.export_boundary().unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_export_shapes_requires_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Arc::new(BufferedNotifier::new());
        let config = AtlasConfig::default().with_export_dir(dir.path());
        let service = AtlasService::with_source(config, full_source(), notifier.clone());

        let result = service.export_shapes();
        assert!(result.is_err());
        assert!(!notifier.take().is_empty());

        service
            .collection()
            .add(DrawnShape::drawn(ShapeGeometry::Marker(LatLng::new(
                20.3, 85.8,
            ))));
        let path = service.export_shapes().unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_subdistrict_click_requires_village_data_when_available() {
        let (service, _) = service_with(full_source());
        service.set_boundaries_enabled(true).await.unwrap();
        service
            .select_region(AdminLevel::State, "Odisha")
            .await
            .unwrap();
        service
            .select_region(AdminLevel::District, "Mayurbhanj")
            .await
            .unwrap();

        // Odisha ships village data, so the subdistrict click needs the
        // village layer to load; the canned source has none, so the click
        // fails and the machine stays put.
        let result = service
            .select_region(AdminLevel::Subdistrict, "Baripada")
            .await;
        assert!(result.is_err());
        let state = service.nav_state();
        assert_eq!(state.level(), NavLevel::District);
        assert!(state.selection.subdistrict.is_none());
    }

    #[tokio::test]
    async fn test_subdistrict_click_advances_where_no_village_data_exists() {
        let kerala_districts = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"dtname":"Wayanad"},
             "geometry":{"type":"Polygon","coordinates":[[[76.0,11.5],[76.5,11.5],[76.5,12.0],[76.0,11.5]]]}}
        ]}"#;
        let kerala_subdistricts = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"sdtname":"Mananthavady","dtname":"Wayanad"},
             "geometry":{"type":"Polygon","coordinates":[[[76.0,11.7],[76.2,11.7],[76.2,11.9],[76.0,11.7]]]}}
        ]}"#;
        let source = full_source()
            .with(BoundaryKey::districts("Kerala"), kerala_districts)
            .with(BoundaryKey::subdistricts("Kerala"), kerala_subdistricts);
        let (service, _) = service_with(source);
        service.set_boundaries_enabled(true).await.unwrap();
        service
            .select_region(AdminLevel::State, "Kerala")
            .await
            .unwrap();
        service
            .select_region(AdminLevel::District, "Wayanad")
            .await
            .unwrap();

        // Kerala ships no village layer, so the click advances with no
        // deeper fetch.
        let state = service
            .select_region(AdminLevel::Subdistrict, "Mananthavady")
            .await
            .unwrap();
        assert_eq!(state.level(), NavLevel::Subdistrict);
        assert_eq!(state.selection.subdistrict.as_deref(), Some("Mananthavady"));
        assert!(state.rendered.at(AdminLevel::Village).is_none());
    }
}
