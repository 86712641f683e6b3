//! Administrative regions: levels, name normalization, upstream naming,
//! property-schema adapters, and the static state catalog.

mod catalog;
mod folder;
mod schema;
mod types;

pub use catalog::{capabilities, has_cfr_potential, has_village_data, StateCapabilities, STATES};
pub use folder::{boundary_file_stem, state_folder};
pub use schema::PropertySchema;
pub use types::{AdminLevel, RegionName};
