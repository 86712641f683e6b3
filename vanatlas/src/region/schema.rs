//! Per-source property schemas for boundary datasets.
//!
//! Each upstream dataset names its regions under a different property key
//! (`STNAME` for states, `dtname` for districts, and several variants for
//! villages). Rather than probing candidate keys at every read site, a
//! [`PropertySchema`] is resolved once per dataset at ingest time and all
//! name lookups go through it.

use geojson::Feature;
use serde_json::Value;

use super::types::AdminLevel;

/// Known property layouts of the boundary datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySchema {
    /// National states file: `STNAME`.
    States,
    /// Per-state district files: `dtname`, with `DISTRICT` in older dumps.
    Districts,
    /// Per-state subdistrict files: `sdtname`, plus `dtname` for the parent
    /// district.
    Subdistricts,
    /// Village files vary the most: `NAME`/`vname`/`name` for the village,
    /// `DISTRICT` and `SUB_DIST`/`tehsil` for the ancestors.
    Villages,
}

impl PropertySchema {
    /// The schema used by the dataset serving a given level's boundaries.
    ///
    /// A level's boundary layer is the collection of its *child* regions, so
    /// `State` maps to the districts schema and so on. `Village` has no
    /// child layer.
    pub fn for_level(level: AdminLevel) -> Option<PropertySchema> {
        match level {
            AdminLevel::Country => Some(PropertySchema::States),
            AdminLevel::State => Some(PropertySchema::Districts),
            AdminLevel::District => Some(PropertySchema::Subdistricts),
            AdminLevel::Subdistrict => Some(PropertySchema::Villages),
            AdminLevel::Village => None,
        }
    }

    /// Extract a feature's region display name.
    pub fn region_name<'a>(&self, feature: &'a Feature) -> Option<&'a str> {
        let keys: &[&str] = match self {
            PropertySchema::States => &["STNAME"],
            PropertySchema::Districts => &["dtname", "DISTRICT"],
            PropertySchema::Subdistricts => &["sdtname"],
            PropertySchema::Villages => &["NAME", "vname", "name"],
        };
        first_string(feature, keys)
    }

    /// Extract the name of the feature's parent district, where the schema
    /// carries one.
    pub fn parent_district<'a>(&self, feature: &'a Feature) -> Option<&'a str> {
        match self {
            PropertySchema::Subdistricts => first_string(feature, &["dtname", "DISTRICT"]),
            PropertySchema::Villages => first_string(feature, &["DISTRICT"]),
            _ => None,
        }
    }

    /// Extract the name of the feature's parent subdistrict, where the
    /// schema carries one.
    pub fn parent_subdistrict<'a>(&self, feature: &'a Feature) -> Option<&'a str> {
        match self {
            PropertySchema::Villages => first_string(feature, &["SUB_DIST", "tehsil"]),
            _ => None,
        }
    }
}

fn first_string<'a>(feature: &'a Feature, keys: &[&str]) -> Option<&'a str> {
    let properties = feature.properties.as_ref()?;
    keys.iter().find_map(|key| {
        properties.get(*key).and_then(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        })
    })
}
