//! User-controlled search criteria sent upstream with each nearby query.

use super::error::{Result, ZeroCostError};
use std::collections::BTreeSet;

/// Default search radius in kilometers.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// Smallest radius reachable with the interactive radius controls.
pub const MIN_RADIUS_KM: f64 = 1.0;

/// Largest radius reachable with the interactive radius controls.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Current filter criteria.
///
/// Only user filter actions change this value; fetch results never do.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Free-text query, empty for no restriction.
    pub query: String,
    /// Selected category identifiers, empty for no restriction.
    pub categories: BTreeSet<String>,
    /// Search radius, always finite and > 0.
    pub max_distance_km: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            categories: BTreeSet::new(),
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }
}

impl FilterState {
    /// Number of active restrictions, shown as a badge next to the filter summary.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.categories.len() + usize::from(!self.query.trim().is_empty())
    }
}

/// A partial update to [`FilterState`]. `None` fields are left untouched.
///
/// # Examples
///
/// ```
/// use zerocost::domain::{FilterPatch, FilterState};
///
/// let mut state = FilterState::default();
/// FilterPatch::new().query("food").apply_to(&mut state).unwrap();
/// assert_eq!(state.query, "food");
/// assert_eq!(state.max_distance_km, 50.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub query: Option<String>,
    pub categories: Option<BTreeSet<String>>,
    pub max_distance_km: Option<f64>,
}

impl FilterPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.categories.is_none() && self.max_distance_km.is_none()
    }

    /// Merges the supplied fields into `state`.
    ///
    /// Validation happens before any field is written, so a rejected patch
    /// leaves `state` exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCostError::InvalidFilter`] when the radius is not a finite
    /// positive number.
    pub fn apply_to(self, state: &mut FilterState) -> Result<()> {
        if let Some(km) = self.max_distance_km {
            if !km.is_finite() || km <= 0.0 {
                return Err(ZeroCostError::InvalidFilter(format!(
                    "max distance must be > 0 km, got {km}"
                )));
            }
        }

        if let Some(query) = self.query {
            state.query = query;
        }
        if let Some(categories) = self.categories {
            state.categories = categories;
        }
        if let Some(km) = self.max_distance_km {
            state.max_distance_km = km;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_replaces_only_supplied_fields() {
        let mut state = FilterState::default();
        FilterPatch::new()
            .categories(["Free Food"])
            .apply_to(&mut state)
            .unwrap();
        FilterPatch::new().max_distance_km(10.0).apply_to(&mut state).unwrap();

        assert!(state.query.is_empty());
        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.max_distance_km, 10.0);
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn invalid_radius_leaves_state_untouched() {
        let mut state = FilterState::default();
        let err = FilterPatch::new()
            .query("tacos")
            .max_distance_km(0.0)
            .apply_to(&mut state);

        assert!(matches!(err, Err(ZeroCostError::InvalidFilter(_))));
        assert_eq!(state, FilterState::default());
    }
}
