//! Core types for the boundary fetch and cache system.

use crate::region::{AdminLevel, RegionName};
use std::fmt;
use thiserror::Error;

/// Key uniquely identifying one boundary dataset.
///
/// A key names the layer actually fetched: the national states file, one
/// state's districts/subdistricts/villages file, or the CFR-potential
/// overlay shipped as a static asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoundaryKey {
    /// National states FeatureCollection.
    States,
    /// District boundaries of one state.
    Districts { state: RegionName },
    /// Subdistrict boundaries of one state.
    Subdistricts { state: RegionName },
    /// Village boundaries of one state.
    Villages { state: RegionName },
    /// Community Forest Resource potential overlay of one state.
    CfrPotential { state: RegionName },
}

impl BoundaryKey {
    pub fn districts(state: impl Into<RegionName>) -> Self {
        Self::Districts {
            state: state.into(),
        }
    }

    pub fn subdistricts(state: impl Into<RegionName>) -> Self {
        Self::Subdistricts {
            state: state.into(),
        }
    }

    pub fn villages(state: impl Into<RegionName>) -> Self {
        Self::Villages {
            state: state.into(),
        }
    }

    pub fn cfr_potential(state: impl Into<RegionName>) -> Self {
        Self::CfrPotential {
            state: state.into(),
        }
    }

    /// The state this key is scoped to, if any.
    pub fn state(&self) -> Option<&RegionName> {
        match self {
            BoundaryKey::States => None,
            BoundaryKey::Districts { state }
            | BoundaryKey::Subdistricts { state }
            | BoundaryKey::Villages { state }
            | BoundaryKey::CfrPotential { state } => Some(state),
        }
    }

    /// The administrative level of the regions in this dataset.
    ///
    /// The CFR overlay is not an administrative layer and has no level.
    pub fn level(&self) -> Option<AdminLevel> {
        match self {
            BoundaryKey::States => Some(AdminLevel::State),
            BoundaryKey::Districts { .. } => Some(AdminLevel::District),
            BoundaryKey::Subdistricts { .. } => Some(AdminLevel::Subdistrict),
            BoundaryKey::Villages { .. } => Some(AdminLevel::Village),
            BoundaryKey::CfrPotential { .. } => None,
        }
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryKey::States => write!(f, "states"),
            BoundaryKey::Districts { state } => write!(f, "districts/{}", state),
            BoundaryKey::Subdistricts { state } => write!(f, "subdistricts/{}", state),
            BoundaryKey::Villages { state } => write!(f, "villages/{}", state),
            BoundaryKey::CfrPotential { state } => write!(f, "cfr-potential/{}", state),
        }
    }
}

/// Errors that can occur while fetching or caching boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Payload was not a GeoJSON FeatureCollection.
    #[error("Invalid boundary payload: {0}")]
    InvalidPayload(String),

    /// The requested layer does not exist for this state.
    #[error("{layer} data is not available for {state}")]
    NotAvailable { layer: String, state: String },

    /// I/O error reading a static data file.
    #[error("Boundary data I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetch was cancelled by a navigation change.
    #[error("Boundary fetch cancelled")]
    Cancelled,
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required a fetch.
    pub misses: u64,
    /// Fetches actually issued to a source.
    pub fetches: u64,
    /// Fetches that ended in an error.
    pub failures: u64,
}

impl CacheStats {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(BoundaryKey::districts("Odisha"));
        set.insert(BoundaryKey::districts("odisha"));
        set.insert(BoundaryKey::districts("Kerala"));
        assert_eq!(set.len(), 2, "Normalized names must collapse");
    }

    #[test]
    fn test_key_levels() {
        assert_eq!(BoundaryKey::States.level(), Some(AdminLevel::State));
        assert_eq!(
            BoundaryKey::districts("Odisha").level(),
            Some(AdminLevel::District)
        );
        assert_eq!(
            BoundaryKey::villages("Odisha").level(),
            Some(AdminLevel::Village)
        );
        assert_eq!(BoundaryKey::cfr_potential("Odisha").level(), None);
    }

    #[test]
    fn test_key_state() {
        assert!(BoundaryKey::States.state().is_none());
        assert_eq!(
            BoundaryKey::subdistricts("Odisha").state().unwrap().as_str(),
            "ODISHA"
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(BoundaryKey::States.to_string(), "states");
        assert_eq!(
            BoundaryKey::districts("Madhya Pradesh").to_string(),
            "districts/MADHYA_PRADESH"
        );
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = CacheStats::default();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_fetch();
        stats.record_failure();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.failures, 1);
    }

    #[test]
    fn test_not_available_message() {
        let err = BoundaryError::NotAvailable {
            layer: "Village".to_string(),
            state: "KERALA".to_string(),
        };
        assert_eq!(err.to_string(), "Village data is not available for KERALA");
    }
}
