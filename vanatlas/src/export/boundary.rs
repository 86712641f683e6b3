//! Boundary GeoJSON export.
//!
//! Serializes the boundary layer of the current navigation level, together
//! with a metadata block describing what was exported and the selection
//! chain at export time.

use geojson::Feature;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use super::ExportError;
use crate::boundary::{BoundaryCache, BoundaryKey};
use crate::nav::{NavLevel, NavState};
use crate::region::{PropertySchema, RegionName};

/// The boundary features resolved for the current view.
#[derive(Debug, Clone)]
pub struct BoundaryExport {
    /// Human-readable name of the exported dataset.
    pub name: String,
    /// Level label recorded in the metadata block.
    pub level_label: &'static str,
    pub features: Vec<Feature>,
}

/// Resolve the boundary data displayed at the current navigation level.
///
/// Returns `None` when nothing is exportable: search mode, village level,
/// or a selection whose data is not in the cache.
pub fn current_boundary_export(state: &NavState, cache: &BoundaryCache) -> Option<BoundaryExport> {
    match state.level() {
        NavLevel::India => {
            let states = cache.get(&BoundaryKey::States)?;
            Some(BoundaryExport {
                name: "India States".to_string(),
                level_label: "states",
                features: states.features.clone(),
            })
        }

        NavLevel::State => {
            let selected = state.selection.state.as_deref()?;
            let districts = cache.get(&BoundaryKey::districts(selected))?;
            Some(BoundaryExport {
                name: format!("{} Districts", selected),
                level_label: "districts",
                features: districts.features.clone(),
            })
        }

        NavLevel::District => {
            let selected_state = state.selection.state.as_deref()?;
            let district = state.selection.district.as_deref()?;
            let subdistricts = cache.get(&BoundaryKey::subdistricts(selected_state))?;

            let schema = PropertySchema::Subdistricts;
            let features: Vec<Feature> = subdistricts
                .features
                .iter()
                .filter(|f| {
                    schema
                        .parent_district(f)
                        .map(|d| RegionName::normalize(d) == RegionName::normalize(district))
                        .unwrap_or(false)
                })
                .cloned()
                .collect();

            if features.is_empty() {
                return None;
            }
            Some(BoundaryExport {
                name: format!("{} Subdistricts, {}", district, selected_state),
                level_label: "subdistricts",
                features,
            })
        }

        NavLevel::Subdistrict => {
            let selected_state = state.selection.state.as_deref()?;
            let district = state.selection.district.as_deref()?;
            let subdistrict = state.selection.subdistrict.as_deref()?;
            let subdistricts = cache.get(&BoundaryKey::subdistricts(selected_state))?;

            let schema = PropertySchema::Subdistricts;
            let found = subdistricts.features.iter().find(|f| {
                let district_matches = schema
                    .parent_district(f)
                    .map(|d| RegionName::normalize(d) == RegionName::normalize(district))
                    .unwrap_or(false);
                let name_matches = schema
                    .region_name(f)
                    .map(|n| RegionName::normalize(n) == RegionName::normalize(subdistrict))
                    .unwrap_or(false);
                district_matches && name_matches
            })?;

            Some(BoundaryExport {
                name: format!("{} Subdistrict, {}, {}", subdistrict, district, selected_state),
                level_label: "subdistrict",
                features: vec![found.clone()],
            })
        }

        NavLevel::Village | NavLevel::Search => None,
    }
}

/// Build the export document: FeatureCollection plus injected metadata.
pub fn boundary_export_json(export: &BoundaryExport, state: &NavState) -> Value {
    let features: Vec<Value> = export
        .features
        .iter()
        .map(|f| serde_json::to_value(f).unwrap_or(Value::Null))
        .collect();

    json!({
        "type": "FeatureCollection",
        "metadata": {
            "name": export.name,
            "level": export.level_label,
            "exportDate": chrono::Utc::now().to_rfc3339(),
            "currentSelection": {
                "state": state.selection.state,
                "district": state.selection.district,
                "subdistrict": state.selection.subdistrict,
            },
        },
        "features": features,
    })
}

/// Export the current boundary view to a `.geojson` file in `dir`.
///
/// The file is named `boundary-{level}-{timestamp}.geojson`.
pub fn write_boundary_file(
    dir: &Path,
    state: &NavState,
    cache: &BoundaryCache,
) -> Result<PathBuf, ExportError> {
    let export = current_boundary_export(state, cache).ok_or_else(|| {
        ExportError::NothingToExport("No boundary data available for current selection".to_string())
    })?;

    let document = boundary_export_json(&export, state);
    let rendered = serde_json::to_string_pretty(&document)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;

    let path = dir.join(format!(
        "boundary-{}-{}.geojson",
        export.level_label,
        chrono::Utc::now().timestamp_millis()
    ));
    std::fs::write(&path, rendered)?;
    info!(
        path = %path.display(),
        features = export.features.len(),
        "Boundary exported"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::parse_feature_collection;
    use crate::nav::{reduce, NavEvent, RenderedLayer};
    use crate::region::AdminLevel;

    fn states_json() -> &'static str {
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"STNAME":"Odisha"},
             "geometry":{"type":"Polygon","coordinates":[[[85.0,20.0],[86.0,20.0],[86.0,21.0],[85.0,20.0]]]}}
        ]}"#
    }

    fn subdistricts_json() -> &'static str {
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"sdtname":"Baripada","dtname":"Mayurbhanj"},
             "geometry":{"type":"Polygon","coordinates":[[[86.0,21.0],[86.5,21.0],[86.5,21.5],[86.0,21.0]]]}},
            {"type":"Feature","properties":{"sdtname":"Udala","dtname":"Mayurbhanj"},
             "geometry":{"type":"Polygon","coordinates":[[[86.1,21.1],[86.6,21.1],[86.6,21.6],[86.1,21.1]]]}},
            {"type":"Feature","properties":{"sdtname":"Bhograi","dtname":"Balasore"},
             "geometry":{"type":"Polygon","coordinates":[[[87.0,21.0],[87.5,21.0],[87.5,21.5],[87.0,21.0]]]}}
        ]}"#
    }

    /// Cache pre-populated through its public fetch path.
    async fn cache_with(entries: Vec<(BoundaryKey, &str)>) -> BoundaryCache {
        use crate::boundary::{BoundarySource, BoundaryError};
        use geojson::FeatureCollection;

        struct Canned(std::collections::HashMap<BoundaryKey, FeatureCollection>);
        impl BoundarySource for Canned {
            async fn fetch(&self, key: &BoundaryKey) -> Result<FeatureCollection, BoundaryError> {
                self.0
                    .get(key)
                    .cloned()
                    .ok_or_else(|| BoundaryError::Http(format!("HTTP 404 for {}", key)))
            }
            fn name(&self) -> &str {
                "canned"
            }
        }

        let mut map = std::collections::HashMap::new();
        for (key, body) in entries {
            map.insert(key, parse_feature_collection(body.as_bytes()).unwrap());
        }
        let source = Canned(map);
        let cache = BoundaryCache::new();
        let keys: Vec<BoundaryKey> = source.0.keys().cloned().collect();
        for key in keys {
            cache.get_or_fetch(&key, &source).await.unwrap();
        }
        cache
    }

    fn nav_at_district(state_name: &str, district: &str) -> NavState {
        let mut state = NavState::new();
        state = reduce(&state, &NavEvent::BoundariesToggled(true));
        state = reduce(
            &state,
            &NavEvent::RegionClicked {
                level: AdminLevel::State,
                name: state_name.to_string(),
            },
        );
        reduce(
            &state,
            &NavEvent::RegionClicked {
                level: AdminLevel::District,
                name: district.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_india_level_exports_states() {
        let cache = cache_with(vec![(BoundaryKey::States, states_json())]).await;
        let mut state = NavState::new();
        state = reduce(&state, &NavEvent::BoundariesToggled(true));

        let export = current_boundary_export(&state, &cache).unwrap();
        assert_eq!(export.level_label, "states");
        assert_eq!(export.name, "India States");
        assert_eq!(export.features.len(), 1);
    }

    #[tokio::test]
    async fn test_district_level_filters_subdistricts() {
        let cache = cache_with(vec![(
            BoundaryKey::subdistricts("Odisha"),
            subdistricts_json(),
        )])
        .await;
        let state = nav_at_district("Odisha", "Mayurbhanj");

        let export = current_boundary_export(&state, &cache).unwrap();
        assert_eq!(export.level_label, "subdistricts");
        assert_eq!(export.features.len(), 2, "Only Mayurbhanj subdistricts");
        assert!(export.name.contains("Mayurbhanj"));
    }

    #[tokio::test]
    async fn test_subdistrict_level_single_feature() {
        let cache = cache_with(vec![(
            BoundaryKey::subdistricts("Odisha"),
            subdistricts_json(),
        )])
        .await;
        let mut state = nav_at_district("Odisha", "Mayurbhanj");
        state = reduce(
            &state,
            &NavEvent::RegionClicked {
                level: AdminLevel::Subdistrict,
                name: "Udala".to_string(),
            },
        );

        let export = current_boundary_export(&state, &cache).unwrap();
        assert_eq!(export.features.len(), 1);
        assert!(export.name.starts_with("Udala"));
    }

    #[tokio::test]
    async fn test_search_mode_exports_nothing() {
        let cache = cache_with(vec![(BoundaryKey::States, states_json())]).await;
        let mut state = NavState::new();
        state = reduce(&state, &NavEvent::BoundariesToggled(true));
        state = reduce(
            &state,
            &NavEvent::SearchApplied {
                layer: RenderedLayer {
                    key: BoundaryKey::States,
                    features: 1,
                },
            },
        );

        assert!(current_boundary_export(&state, &cache).is_none());
    }

    #[tokio::test]
    async fn test_missing_cache_data_exports_nothing() {
        let cache = BoundaryCache::new();
        let state = nav_at_district("Odisha", "Mayurbhanj");
        assert!(current_boundary_export(&state, &cache).is_none());
    }

    #[tokio::test]
    async fn test_export_json_carries_metadata() {
        let cache = cache_with(vec![(
            BoundaryKey::subdistricts("Odisha"),
            subdistricts_json(),
        )])
        .await;
        let state = nav_at_district("Odisha", "Mayurbhanj");
        let export = current_boundary_export(&state, &cache).unwrap();

        let json = boundary_export_json(&export, &state);
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["metadata"]["level"], "subdistricts");
        assert_eq!(json["metadata"]["currentSelection"]["state"], "Odisha");
        assert_eq!(
            json["metadata"]["currentSelection"]["district"],
            "Mayurbhanj"
        );
        assert!(json["metadata"]["exportDate"].as_str().is_some());
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_write_boundary_file() {
        let cache = cache_with(vec![(BoundaryKey::States, states_json())]).await;
        let mut state = NavState::new();
        state = reduce(&state, &NavEvent::BoundariesToggled(true));

        let dir = tempfile::tempdir().unwrap();
        let path = write_boundary_file(dir.path(), &state, &cache).unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("boundary-states-"));
        assert!(name.ends_with(".geojson"));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["metadata"]["name"], "India States");
    }

    #[tokio::test]
    async fn test_write_boundary_file_with_nothing_selected() {
        let cache = BoundaryCache::new();
        let state = NavState::new();
        let dir = tempfile::tempdir().unwrap();
        let result = write_boundary_file(dir.path(), &state, &cache);
        assert!(matches!(result, Err(ExportError::NothingToExport(_))));
    }
}
