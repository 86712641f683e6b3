//! Static catalog of states and per-state data availability.

use super::types::RegionName;

/// Display names of the states selectable in the combo search.
pub const STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Jammu and Kashmir",
    "Delhi",
];

/// Per-state availability of the optional deep layers.
///
/// Village boundaries and the CFR-potential overlay ship as static files for
/// a single state today; requests for any other state must fail fast with a
/// descriptive message instead of attempting a network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCapabilities {
    pub has_villages: bool,
    pub has_cfr_potential: bool,
}

/// States with any layer beyond districts/subdistricts.
const CAPABILITIES: &[(&str, StateCapabilities)] = &[
    (
        "ODISHA",
        StateCapabilities {
            has_villages: true,
            has_cfr_potential: true,
        },
    ),
    (
        "MADHYA_PRADESH",
        StateCapabilities {
            has_villages: false,
            has_cfr_potential: false,
        },
    ),
    (
        "TRIPURA",
        StateCapabilities {
            has_villages: false,
            has_cfr_potential: false,
        },
    ),
    (
        "TELANGANA",
        StateCapabilities {
            has_villages: false,
            has_cfr_potential: false,
        },
    ),
];

/// Look up a state's capabilities.
///
/// States not present in the table have no deep layers.
pub fn capabilities(state: &RegionName) -> StateCapabilities {
    CAPABILITIES
        .iter()
        .find(|(name, _)| *name == state.as_str())
        .map(|(_, caps)| *caps)
        .unwrap_or(StateCapabilities {
            has_villages: false,
            has_cfr_potential: false,
        })
}

/// Whether village boundaries can be loaded for a state.
pub fn has_village_data(state: &RegionName) -> bool {
    capabilities(state).has_villages
}

/// Whether the CFR-potential overlay can be loaded for a state.
pub fn has_cfr_potential(state: &RegionName) -> bool {
    capabilities(state).has_cfr_potential
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odisha_has_deep_layers() {
        let odisha = RegionName::normalize("Odisha");
        assert!(has_village_data(&odisha));
        assert!(has_cfr_potential(&odisha));
    }

    #[test]
    fn test_listed_state_without_villages() {
        let mp = RegionName::normalize("Madhya Pradesh");
        assert!(!has_village_data(&mp));
        assert!(!has_cfr_potential(&mp));
    }

    #[test]
    fn test_unlisted_state_has_nothing() {
        let kerala = RegionName::normalize("Kerala");
        assert!(!has_village_data(&kerala));
        assert!(!has_cfr_potential(&kerala));
    }

    #[test]
    fn test_state_list_contains_odisha() {
        assert!(STATES.contains(&"Odisha"));
        assert_eq!(STATES.len(), 30);
    }
}
