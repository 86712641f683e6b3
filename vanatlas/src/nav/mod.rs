//! Navigation: the country → state → district → subdistrict → village
//! drilldown machine, the selection chain, and rendered-layer bookkeeping.

mod machine;
mod types;

pub use machine::{reduce, NavEvent, NavState, Navigator};
pub use types::{LayerSet, NavLevel, RenderedLayer, Selection};
