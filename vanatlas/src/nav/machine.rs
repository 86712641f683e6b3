//! The drilldown state machine.
//!
//! Navigation is modeled as a pure reducer over [`NavState`]: every user
//! action becomes a [`NavEvent`] and `reduce` returns the next state without
//! mutating the current one. The [`Navigator`] wraps the reducer with an
//! epoch counter and a cancellation token so in-flight fetches belonging to
//! a superseded navigation context can be cancelled and their late results
//! discarded.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{LayerSet, NavLevel, RenderedLayer, Selection};
use crate::region::AdminLevel;

/// Complete navigation state.
#[derive(Debug, Clone, PartialEq)]
pub struct NavState {
    pub level: NavLevel,
    pub selection: Selection,
    pub rendered: LayerSet,
    pub boundaries_enabled: bool,
}

impl Default for NavState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavState {
    /// Initial state: country view, nothing selected, boundaries off until
    /// the user enables them.
    pub fn new() -> Self {
        Self {
            level: NavLevel::India,
            selection: Selection::default(),
            rendered: LayerSet::default(),
            boundaries_enabled: false,
        }
    }

    pub fn level(&self) -> NavLevel {
        self.level
    }

    pub fn in_search(&self) -> bool {
        self.level() == NavLevel::Search
    }
}

/// A navigation action fed to the reducer.
#[derive(Debug, Clone)]
pub enum NavEvent {
    /// A rendered region polygon was clicked. The click is applied only
    /// after the region's child data (if any) loaded successfully, so the
    /// machine never advances past missing data.
    RegionClicked { level: AdminLevel, name: String },
    /// A child boundary layer finished loading and should be rendered.
    ChildLayerLoaded { layer: RenderedLayer, level: AdminLevel },
    /// A combo-search result was applied, bypassing the click chain.
    SearchApplied { layer: RenderedLayer },
    /// Manual reset to the country view.
    ResetToCountry,
    /// Boundary display toggled on or off.
    BoundariesToggled(bool),
}

/// Compute the next navigation state for an event.
///
/// Pure: the input state is never modified. Events that would violate the
/// selection-chain invariant (for example a district click with no state
/// selected) leave the state unchanged.
pub fn reduce(state: &NavState, event: &NavEvent) -> NavState {
    let mut next = state.clone();

    match event {
        NavEvent::RegionClicked { level, name } => {
            if !next.boundaries_enabled {
                return next;
            }
            // Search bypasses the chain, so a manual click starts over from
            // whatever the click names; its ancestors must be in place.
            if !next.selection.ancestors_selected(*level) {
                debug!(level = %level, name = name, "Ignoring click without selected ancestors");
                return next;
            }
            let Some(nav_level) = NavLevel::for_clicked(*level) else {
                return next;
            };

            next.selection.select(*level, name.clone());
            next.level = nav_level;
            // Leaving search mode drops the highlighted result layer.
            if state.in_search() {
                next.rendered.clear();
            } else {
                next.rendered.remove_deeper_than(*level);
            }
        }

        NavEvent::ChildLayerLoaded { layer, level } => {
            if !next.boundaries_enabled {
                return next;
            }
            next.rendered.render(*level, layer.clone());
        }

        NavEvent::SearchApplied { layer } => {
            next.selection.clear();
            next.rendered.set_search(layer.clone());
            next.level = NavLevel::Search;
        }

        NavEvent::ResetToCountry => {
            next.selection.clear();
            next.rendered.clear();
            next.level = NavLevel::India;
        }

        NavEvent::BoundariesToggled(enabled) => {
            next.boundaries_enabled = *enabled;
            if !enabled {
                // Turning boundaries off clears everything; turning them
                // back on does not restore the previous selection.
                next.selection.clear();
                next.rendered.clear();
                next.level = NavLevel::India;
            }
        }
    }

    debug_assert!(next.selection.is_consistent());
    next
}

/// Whether an event supersedes in-flight navigation work.
fn changes_context(event: &NavEvent) -> bool {
    !matches!(event, NavEvent::ChildLayerLoaded { .. })
}

/// Navigation driver: reducer state plus epoch tracking.
pub struct Navigator {
    state: NavState,
    epoch: u64,
    cancel: CancellationToken,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: NavState::new(),
            epoch: 0,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// The current navigation epoch.
    ///
    /// Every context-changing event bumps the epoch; an async result tagged
    /// with an older epoch must be discarded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether an epoch recorded at fetch-issue time is still current.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// A cancellation token tied to the current epoch.
    ///
    /// Cancelled as soon as the navigation context changes.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Apply an event and return the new state.
    ///
    /// Every context-changing event advances the epoch and cancels the
    /// previous epoch's token, even when the reducer leaves the state
    /// unchanged: a reset issued while a fetch is in flight must still
    /// invalidate that fetch.
    pub fn apply(&mut self, event: NavEvent) -> &NavState {
        if changes_context(&event) {
            self.epoch += 1;
            self.cancel.cancel();
            self.cancel = CancellationToken::new();
            debug!(epoch = self.epoch, "Navigation epoch advanced");
        }
        self.state = reduce(&self.state, &event);
        &self.state
    }
}
