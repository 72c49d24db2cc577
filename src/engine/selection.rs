//! Selection coordinator shared by the list and map views.
//!
//! Selection is held as an event id, never as a reference into a result set,
//! so replacing the event set cannot leave a dangling pointer. The detail
//! popup is a function of the selection: it is open exactly while an id is
//! selected.

use super::fetch::EventSet;
use crate::domain::{EventRecord, Result, ZeroCostError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCoordinator {
    selected: Option<String>,
}

impl SelectionCoordinator {
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Selects `id`, or clears the selection with `None`.
    ///
    /// Returns whether the selection changed.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCostError::SelectionInvalid`] when `id` is not in
    /// `events`. The previous selection is kept.
    pub fn select(&mut self, id: Option<&str>, events: &EventSet) -> Result<bool> {
        let Some(id) = id else {
            return Ok(self.selected.take().is_some());
        };

        if !events.contains(id) {
            return Err(ZeroCostError::SelectionInvalid { id: id.to_string() });
        }

        if self.selected.as_deref() == Some(id) {
            return Ok(false);
        }

        tracing::debug!(id, "event selected");
        self.selected = Some(id.to_string());
        Ok(true)
    }

    /// Drops the selection if its id is gone from `events`.
    ///
    /// Idempotent. Returns whether the selection was cleared.
    pub fn reconcile(&mut self, events: &EventSet) -> bool {
        match self.selected.as_deref() {
            Some(id) if !events.contains(id) => {
                tracing::debug!(id, "selected event left the result set");
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected record, looked up in `events`.
    #[must_use]
    pub fn selected<'a>(&self, events: &'a EventSet) -> Option<&'a EventRecord> {
        self.selected.as_deref().and_then(|id| events.get(id))
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Whether the detail popup is open.
    #[must_use]
    pub const fn popup_open(&self) -> bool {
        self.selected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, DEFAULT_FALLBACK};
    use chrono::{TimeZone, Utc};

    fn set(ids: &[&str]) -> EventSet {
        let records = ids
            .iter()
            .map(|id| EventRecord {
                id: (*id).to_string(),
                title: (*id).to_string(),
                description: String::new(),
                location: DEFAULT_FALLBACK,
                address: String::new(),
                start_time: Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap(),
                end_time: None,
                category: Category::Sports,
                category_id: None,
                source: String::new(),
                source_id: None,
                source_url: None,
                image_url: None,
                organizer_name: None,
                organizer_contact: None,
                capacity: None,
                is_verified: false,
                created_at: None,
                updated_at: None,
                distance_km: None,
                score: None,
            })
            .collect();
        EventSet::new(records)
    }

    #[test]
    fn select_clear_select_round_trip() {
        let events = set(&["a", "b"]);
        let mut sel = SelectionCoordinator::new();

        assert!(sel.select(Some("a"), &events).unwrap());
        assert!(sel.popup_open());
        assert!(sel.select(None, &events).unwrap());
        assert!(!sel.popup_open());
        assert!(sel.select(Some("a"), &events).unwrap());
        assert_eq!(sel.selected(&events).map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn unknown_id_keeps_previous_selection() {
        let events = set(&["a"]);
        let mut sel = SelectionCoordinator::new();
        sel.select(Some("a"), &events).unwrap();

        let err = sel.select(Some("ghost"), &events);
        assert!(matches!(err, Err(ZeroCostError::SelectionInvalid { .. })));
        assert_eq!(sel.current(), Some("a"));
    }

    #[test]
    fn reselecting_same_id_is_not_a_change() {
        let events = set(&["a"]);
        let mut sel = SelectionCoordinator::new();
        sel.select(Some("a"), &events).unwrap();
        assert!(!sel.select(Some("a"), &events).unwrap());
    }

    #[test]
    fn reconcile_clears_missing_and_is_idempotent() {
        let mut sel = SelectionCoordinator::new();
        sel.select(Some("a"), &set(&["a", "b"])).unwrap();

        let next = set(&["b", "c"]);
        assert!(sel.reconcile(&next));
        assert!(!sel.reconcile(&next));
        assert_eq!(sel.current(), None);
        assert!(!sel.popup_open());
    }

    #[test]
    fn reconcile_keeps_surviving_selection() {
        let mut sel = SelectionCoordinator::new();
        sel.select(Some("b"), &set(&["a", "b"])).unwrap();
        assert!(!sel.reconcile(&set(&["b"])));
        assert_eq!(sel.current(), Some("b"));
    }
}
