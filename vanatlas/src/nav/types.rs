//! Navigation state types: levels, the selection chain, and rendered-layer
//! bookkeeping.

use crate::boundary::BoundaryKey;
use crate::region::AdminLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The level the map view is currently at.
///
/// Mirrors the drilldown hierarchy plus the orthogonal `Search` mode, which
/// bypasses the click chain entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavLevel {
    India,
    State,
    District,
    Subdistrict,
    Village,
    Search,
}

impl NavLevel {
    /// The view level reached by clicking a region of the given
    /// administrative level.
    pub fn for_clicked(level: AdminLevel) -> Option<NavLevel> {
        match level {
            AdminLevel::Country => None,
            AdminLevel::State => Some(NavLevel::State),
            AdminLevel::District => Some(NavLevel::District),
            AdminLevel::Subdistrict => Some(NavLevel::Subdistrict),
            AdminLevel::Village => Some(NavLevel::Village),
        }
    }
}

impl fmt::Display for NavLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavLevel::India => write!(f, "india"),
            NavLevel::State => write!(f, "state"),
            NavLevel::District => write!(f, "district"),
            NavLevel::Subdistrict => write!(f, "subdistrict"),
            NavLevel::Village => write!(f, "village"),
            NavLevel::Search => write!(f, "search"),
        }
    }
}

/// The chain of selected regions, by display name.
///
/// Invariant: a selector is `Some` only if every shallower selector is
/// `Some`. The reducer maintains this by clearing deeper selectors whenever
/// a shallower one changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub state: Option<String>,
    pub district: Option<String>,
    pub subdistrict: Option<String>,
    pub village: Option<String>,
}

impl Selection {
    /// The selector for one administrative level.
    pub fn at(&self, level: AdminLevel) -> Option<&str> {
        match level {
            AdminLevel::Country => None,
            AdminLevel::State => self.state.as_deref(),
            AdminLevel::District => self.district.as_deref(),
            AdminLevel::Subdistrict => self.subdistrict.as_deref(),
            AdminLevel::Village => self.village.as_deref(),
        }
    }

    /// Set the selector at a level and clear everything deeper.
    pub fn select(&mut self, level: AdminLevel, name: String) {
        match level {
            AdminLevel::Country => {}
            AdminLevel::State => {
                self.state = Some(name);
                self.district = None;
                self.subdistrict = None;
                self.village = None;
            }
            AdminLevel::District => {
                self.district = Some(name);
                self.subdistrict = None;
                self.village = None;
            }
            AdminLevel::Subdistrict => {
                self.subdistrict = Some(name);
                self.village = None;
            }
            AdminLevel::Village => {
                self.village = Some(name);
            }
        }
    }

    /// Clear the whole chain.
    pub fn clear(&mut self) {
        *self = Selection::default();
    }

    /// Whether the selector at a level may be set, i.e. every ancestor
    /// selector is already set.
    pub fn ancestors_selected(&self, level: AdminLevel) -> bool {
        match level {
            AdminLevel::Country | AdminLevel::State => true,
            AdminLevel::District => self.state.is_some(),
            AdminLevel::Subdistrict => self.state.is_some() && self.district.is_some(),
            AdminLevel::Village => {
                self.state.is_some() && self.district.is_some() && self.subdistrict.is_some()
            }
        }
    }

    /// Check the ancestor invariant over the whole chain.
    pub fn is_consistent(&self) -> bool {
        let levels = [
            self.state.is_some(),
            self.district.is_some(),
            self.subdistrict.is_some(),
            self.village.is_some(),
        ];
        // Once a level is unset, everything deeper must be unset too.
        !levels.windows(2).any(|w| !w[0] && w[1])
    }
}

/// Metadata for one rendered boundary layer.
///
/// The engine tracks what is rendered; the actual drawing surface lives with
/// the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLayer {
    /// The dataset this layer was built from.
    pub key: BoundaryKey,
    /// Number of features in the layer (after any district filtering).
    pub features: usize,
}

/// The set of boundary layers currently on the map.
///
/// At most one layer per administrative level, plus at most one search
/// result layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    layers: BTreeMap<AdminLevel, RenderedLayer>,
    search: Option<RenderedLayer>,
}

impl LayerSet {
    /// Render a layer at a level, replacing any previous layer there.
    pub fn render(&mut self, level: AdminLevel, layer: RenderedLayer) {
        self.layers.insert(level, layer);
    }

    /// Remove the layer at a level.
    pub fn remove(&mut self, level: AdminLevel) {
        self.layers.remove(&level);
    }

    /// Remove every layer strictly deeper than a level.
    pub fn remove_deeper_than(&mut self, level: AdminLevel) {
        self.layers.retain(|l, _| *l <= level);
    }

    /// Remove every layer, including any search layer.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.search = None;
    }

    /// Replace all layers with a single search result layer.
    pub fn set_search(&mut self, layer: RenderedLayer) {
        self.layers.clear();
        self.search = Some(layer);
    }

    pub fn search(&self) -> Option<&RenderedLayer> {
        self.search.as_ref()
    }

    pub fn at(&self, level: AdminLevel) -> Option<&RenderedLayer> {
        self.layers.get(&level)
    }

    /// Rendered administrative levels, shallowest first.
    pub fn rendered_levels(&self) -> Vec<AdminLevel> {
        self.layers.keys().copied().collect()
    }

    /// Total number of layers on the map.
    pub fn len(&self) -> usize {
        self.layers.len() + usize::from(self.search.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_select_clears_deeper() {
        let mut sel = Selection::default();
        sel.select(AdminLevel::State, "Odisha".to_string());
        sel.select(AdminLevel::District, "Mayurbhanj".to_string());
        sel.select(AdminLevel::Subdistrict, "Baripada".to_string());

        sel.select(AdminLevel::District, "Khordha".to_string());
        assert_eq!(sel.district.as_deref(), Some("Khordha"));
        assert!(sel.subdistrict.is_none());
        assert!(sel.village.is_none());
        assert!(sel.is_consistent());
    }

    #[test]
    fn test_selection_state_change_clears_chain() {
        let mut sel = Selection::default();
        sel.select(AdminLevel::State, "Odisha".to_string());
        sel.select(AdminLevel::District, "Mayurbhanj".to_string());
        sel.select(AdminLevel::State, "Kerala".to_string());
        assert!(sel.district.is_none());
        assert!(sel.is_consistent());
    }

    #[test]
    fn test_ancestors_selected() {
        let mut sel = Selection::default();
        assert!(sel.ancestors_selected(AdminLevel::State));
        assert!(!sel.ancestors_selected(AdminLevel::District));

        sel.select(AdminLevel::State, "Odisha".to_string());
        assert!(sel.ancestors_selected(AdminLevel::District));
        assert!(!sel.ancestors_selected(AdminLevel::Subdistrict));

        sel.select(AdminLevel::District, "Mayurbhanj".to_string());
        assert!(sel.ancestors_selected(AdminLevel::Subdistrict));
    }

    #[test]
    fn test_inconsistent_chain_detected() {
        let sel = Selection {
            state: None,
            district: Some("Mayurbhanj".to_string()),
            subdistrict: None,
            village: None,
        };
        assert!(!sel.is_consistent());
    }

    #[test]
    fn test_layer_set_one_per_level() {
        let mut layers = LayerSet::default();
        layers.render(
            AdminLevel::District,
            RenderedLayer {
                key: BoundaryKey::districts("Odisha"),
                features: 30,
            },
        );
        layers.render(
            AdminLevel::District,
            RenderedLayer {
                key: BoundaryKey::districts("Kerala"),
                features: 14,
            },
        );
        assert_eq!(layers.len(), 1);
        assert_eq!(
            layers.at(AdminLevel::District).unwrap().key,
            BoundaryKey::districts("Kerala")
        );
    }

    #[test]
    fn test_layer_set_remove_deeper_than() {
        let mut layers = LayerSet::default();
        layers.render(
            AdminLevel::State,
            RenderedLayer {
                key: BoundaryKey::States,
                features: 30,
            },
        );
        layers.render(
            AdminLevel::District,
            RenderedLayer {
                key: BoundaryKey::districts("Odisha"),
                features: 30,
            },
        );
        layers.render(
            AdminLevel::Subdistrict,
            RenderedLayer {
                key: BoundaryKey::subdistricts("Odisha"),
                features: 12,
            },
        );

        layers.remove_deeper_than(AdminLevel::State);
        assert_eq!(layers.rendered_levels(), vec![AdminLevel::State]);
    }

    #[test]
    fn test_layer_set_search_replaces_all() {
        let mut layers = LayerSet::default();
        layers.render(
            AdminLevel::State,
            RenderedLayer {
                key: BoundaryKey::States,
                features: 30,
            },
        );
        layers.set_search(RenderedLayer {
            key: BoundaryKey::districts("Odisha"),
            features: 1,
        });
        assert!(layers.at(AdminLevel::State).is_none());
        assert!(layers.search().is_some());
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_nav_level_for_clicked() {
        assert_eq!(
            NavLevel::for_clicked(AdminLevel::State),
            Some(NavLevel::State)
        );
        assert_eq!(NavLevel::for_clicked(AdminLevel::Country), None);
    }
}
