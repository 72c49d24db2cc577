//! Query parameter store.
//!
//! Holds the single mutable [`FilterState`] of the session. Each successful
//! `update`/`clear` bumps a revision and returns a [`FilterChange`], which the
//! caller passes straight on to the fetch controller within the same event.

use crate::domain::{FilterPatch, FilterState, Result};

/// Notification produced by every accepted filter mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    pub revision: u64,
    pub filters: FilterState,
}

#[derive(Debug, Clone, Default)]
pub struct QueryStore {
    state: FilterState,
    revision: u64,
}

impl QueryStore {
    #[must_use]
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: initial,
            revision: 0,
        }
    }

    /// Replaces the supplied fields, preserving the rest.
    ///
    /// # Errors
    ///
    /// Propagates [`FilterPatch::apply_to`] validation errors; the state and
    /// revision are unchanged in that case.
    pub fn update(&mut self, patch: FilterPatch) -> Result<FilterChange> {
        patch.apply_to(&mut self.state)?;
        Ok(self.notify("update"))
    }

    /// Resets to the documented defaults: empty query, no categories, 50 km.
    pub fn clear(&mut self) -> FilterChange {
        self.state = FilterState::default();
        self.notify("clear")
    }

    #[must_use]
    pub const fn current(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn notify(&mut self, op: &'static str) -> FilterChange {
        self.revision += 1;
        tracing::debug!(
            op,
            revision = self.revision,
            query = %self.state.query,
            categories = self.state.categories.len(),
            max_distance_km = self.state.max_distance_km,
            "filters changed"
        );
        FilterChange {
            revision: self.revision,
            filters: self.state.clone(),
        }
    }
}
