//! Administrative level and region name types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One level of the administrative drilldown hierarchy.
///
/// Ordering follows the drilldown: each variant's children sit exactly one
/// step below it. The navigation machine enforces that a selected region's
/// level is one step below its parent's; the data itself carries no such
/// guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    Country,
    State,
    District,
    Subdistrict,
    Village,
}

impl AdminLevel {
    /// The level one step below this one, if any.
    pub fn child(self) -> Option<AdminLevel> {
        match self {
            AdminLevel::Country => Some(AdminLevel::State),
            AdminLevel::State => Some(AdminLevel::District),
            AdminLevel::District => Some(AdminLevel::Subdistrict),
            AdminLevel::Subdistrict => Some(AdminLevel::Village),
            AdminLevel::Village => None,
        }
    }

    /// The level one step above this one, if any.
    pub fn parent(self) -> Option<AdminLevel> {
        match self {
            AdminLevel::Country => None,
            AdminLevel::State => Some(AdminLevel::Country),
            AdminLevel::District => Some(AdminLevel::State),
            AdminLevel::Subdistrict => Some(AdminLevel::District),
            AdminLevel::Village => Some(AdminLevel::Subdistrict),
        }
    }

    /// Upstream file-name segment for this level (`DISTRICTS`,
    /// `SUBDISTRICTS`, `VILLAGES`).
    ///
    /// Country and state boundaries come from a fixed national file and have
    /// no per-state segment.
    pub fn file_segment(self) -> Option<&'static str> {
        match self {
            AdminLevel::Country | AdminLevel::State => None,
            AdminLevel::District => Some("DISTRICTS"),
            AdminLevel::Subdistrict => Some("SUBDISTRICTS"),
            AdminLevel::Village => Some("VILLAGES"),
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminLevel::Country => write!(f, "country"),
            AdminLevel::State => write!(f, "state"),
            AdminLevel::District => write!(f, "district"),
            AdminLevel::Subdistrict => write!(f, "subdistrict"),
            AdminLevel::Village => write!(f, "village"),
        }
    }
}

/// A normalized region name used as a cache and lookup key.
///
/// Normalization uppercases, turns spaces into underscores, and strips every
/// character outside `[A-Z0-9_]`, matching the upstream folder naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionName(String);

impl RegionName {
    /// Normalize a raw display name.
    pub fn normalize(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c == ' ' { '_' } else { c })
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
            .collect();
        Self(normalized)
    }

    /// The normalized key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionName {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_parent_chain() {
        assert_eq!(AdminLevel::Country.child(), Some(AdminLevel::State));
        assert_eq!(AdminLevel::State.child(), Some(AdminLevel::District));
        assert_eq!(AdminLevel::District.child(), Some(AdminLevel::Subdistrict));
        assert_eq!(AdminLevel::Subdistrict.child(), Some(AdminLevel::Village));
        assert_eq!(AdminLevel::Village.child(), None);

        assert_eq!(AdminLevel::Country.parent(), None);
        assert_eq!(AdminLevel::Village.parent(), Some(AdminLevel::Subdistrict));
    }

    #[test]
    fn test_parent_is_inverse_of_child() {
        for level in [
            AdminLevel::Country,
            AdminLevel::State,
            AdminLevel::District,
            AdminLevel::Subdistrict,
        ] {
            assert_eq!(level.child().unwrap().parent(), Some(level));
        }
    }

    #[test]
    fn test_level_ordering_follows_depth() {
        assert!(AdminLevel::Country < AdminLevel::State);
        assert!(AdminLevel::State < AdminLevel::District);
        assert!(AdminLevel::District < AdminLevel::Subdistrict);
        assert!(AdminLevel::Subdistrict < AdminLevel::Village);
    }

    #[test]
    fn test_file_segments() {
        assert_eq!(AdminLevel::District.file_segment(), Some("DISTRICTS"));
        assert_eq!(AdminLevel::Subdistrict.file_segment(), Some("SUBDISTRICTS"));
        assert_eq!(AdminLevel::Village.file_segment(), Some("VILLAGES"));
        assert_eq!(AdminLevel::State.file_segment(), None);
    }

    #[test]
    fn test_normalize_uppercases_and_underscores() {
        assert_eq!(RegionName::normalize("Madhya Pradesh").as_str(), "MADHYA_PRADESH");
        assert_eq!(RegionName::normalize("Odisha").as_str(), "ODISHA");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(
            RegionName::normalize("Jammu & Kashmir").as_str(),
            "JAMMU__KASHMIR"
        );
        assert_eq!(RegionName::normalize("Mayūrbhañj").as_str(), "MAYRBHAJ");
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(RegionName::normalize("  Odisha  ").as_str(), "ODISHA");
    }

    #[test]
    fn test_normalize_empty() {
        assert!(RegionName::normalize("").is_empty());
        assert!(RegionName::normalize("   ").is_empty());
    }

    #[test]
    fn test_normalized_names_compare_equal() {
        assert_eq!(
            RegionName::normalize("tamil nadu"),
            RegionName::normalize("Tamil Nadu")
        );
    }
}
