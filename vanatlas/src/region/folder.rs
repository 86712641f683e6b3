//! Upstream folder and file naming for the boundary shapefile host.
//!
//! The remote repository predates several state renames and keeps spaces in
//! some folder names, so a handful of states need explicit overrides. The
//! most visible one is Odisha, whose folder still carries the legacy
//! "ORISSA" name while the files inside were renamed to `ODISHA_*`.

use super::types::{AdminLevel, RegionName};

/// Fixed table of normalized state name → upstream folder name overrides.
const FOLDER_OVERRIDES: &[(&str, &str)] = &[
    ("ODISHA", "ORISSA"),
    ("ORISSA", "ORISSA"),
    ("BIHAR", "BIHAR"),
    ("MADHYA_PRADESH", "MADHYA PRADESH"),
    ("JAMMU_AND_KASHMIR", "JAMMU KASHMIR"),
    ("ANDHRA_PRADESH", "ANDHRA PRADESH"),
    ("HIMACHAL_PRADESH", "HIMACHAL PRADESH"),
    ("UTTAR_PRADESH", "UTTAR PRADESH"),
    ("WEST_BENGAL", "WEST BENGAL"),
    ("TAMIL_NADU", "TAMIL NADU"),
];

/// Resolve the upstream folder name for a state.
///
/// Falls back to the normalized name for states without an override.
pub fn state_folder(state: &RegionName) -> String {
    FOLDER_OVERRIDES
        .iter()
        .find(|(name, _)| *name == state.as_str())
        .map(|(_, folder)| folder.to_string())
        .unwrap_or_else(|| state.as_str().to_string())
}

/// Resolve the upstream file stem for a state and level.
///
/// Files are named `{FOLDER}_{LEVEL}` with one exception: inside the legacy
/// `ORISSA` folder the files use the modern `ODISHA_` prefix.
pub fn boundary_file_stem(state: &RegionName, level: AdminLevel) -> Option<String> {
    let segment = level.file_segment()?;
    let folder = state_folder(state);
    let prefix = if folder == "ORISSA" {
        "ODISHA".to_string()
    } else {
        folder
    };
    Some(format!("{}_{}", prefix, segment))
}
