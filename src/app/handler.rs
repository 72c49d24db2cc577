//! Event handling and state transition logic.
//!
//! [`handle_event`] is the only place application state changes. It takes
//! key presses, mouse clicks, timers and web replies, drives the engine
//! components in a fixed order (location, filters, fetch, selection) and
//! returns the side effects for the plugin shim to perform.
//!
//! # Event Types
//!
//! - **Lifecycle**: `Start`, `PermissionDenied`, `CloseFocus`
//! - **Location**: `PositionFound`, `PositionFailed`, `Timer`, `RefreshLocation`
//! - **Remote**: `WebResponse`, `EventsLoaded`, `CategoriesLoaded`, `DetailLoaded`
//! - **Filters**: `SearchMode`, `Char`, `Backspace`, `ToggleCategory`,
//!   `WidenRadius`, `NarrowRadius`, `ClearFilters`, `Retry`
//! - **Selection**: `Next`, `Prev`, `Activate`, `Dismiss`, `ToggleFocus`,
//!   `Click`, `RequestDetail`
//!
//! # Example
//!
//! ```rust
//! use zerocost::app::{handle_event, AppState, Event};
//! use zerocost::ui::theme::Theme;
//! use zerocost::Config;
//!
//! let mut state = AppState::new(Config::default(), Theme::default());
//! let (render, actions) = handle_event(&mut state, &Event::Start)?;
//! assert!(render);
//! assert!(!actions.is_empty());
//! # Ok::<(), zerocost::domain::ZeroCostError>(())
//! ```

use super::modes::InputMode;
use super::state::Hit;
use crate::app::{Action, AppState};
use crate::domain::filter::{MAX_RADIUS_KM, MIN_RADIUS_KM};
use crate::domain::{Category, CategoryCatalog, CategoryInfo, Coordinate, EventRecord, FilterPatch, Result};
use crate::engine::{Completion, FetchError, FetchTicket, FilterChange, LocationFailure, Resolution};
use crate::remote::{decode_response, geolocate, RequestContext};
use crate::LocationSource;
use std::collections::BTreeMap;

/// Kilometers added or removed by one radius key press.
pub const RADIUS_STEP_KM: f64 = 5.0;

/// Events triggered by user input, host callbacks, or web replies.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Permissions were granted; issue the startup requests.
    Start,
    /// Web access was refused. Location falls back and the first fetch still
    /// goes out.
    PermissionDenied,
    /// Closes the floating pane and hides the plugin UI.
    CloseFocus,

    /// The location capability answered `attempt`.
    PositionFound { attempt: u64, coordinate: Coordinate },
    /// The location capability refused or garbled `attempt`.
    PositionFailed { attempt: u64, failure: LocationFailure },
    /// A host timer fired. Timers are anonymous; the oldest armed one is meant.
    Timer,
    /// Re-resolves the location (`L`).
    RefreshLocation,

    /// Raw reply to an [`Action::Http`]; decoded using its context map.
    WebResponse {
        status: u16,
        body: Vec<u8>,
        context: BTreeMap<String, String>,
    },
    /// Outcome of the nearby (or search) request tagged `generation`.
    EventsLoaded {
        generation: u64,
        outcome: std::result::Result<Vec<EventRecord>, FetchError>,
    },
    CategoriesLoaded(std::result::Result<Vec<CategoryInfo>, String>),
    DetailLoaded {
        id: String,
        outcome: std::result::Result<EventRecord, String>,
    },
    /// Re-issues the last nearby query unchanged (`r`).
    Retry,
    /// Looks up full details for the selected event (`d`).
    RequestDetail,

    /// Opens the search box with the committed query as draft.
    SearchMode,
    /// Appends a character to the search draft.
    Char(char),
    /// Removes the last character from the search draft.
    Backspace,
    /// Toggles `Category::SELECTABLE[n]`.
    ToggleCategory(usize),
    WidenRadius,
    NarrowRadius,
    ClearFilters,

    /// List focus: cursor down. Map focus: select the next marker.
    Next,
    /// List focus: cursor up. Map focus: select the previous marker.
    Prev,
    /// Enter. Commits the search draft, or selects the row under the cursor.
    Activate,
    /// Esc. Discards the search draft, or closes the popup.
    Dismiss,
    /// Switches navigation between list and map.
    ToggleFocus,
    /// Left click at a 1-indexed cell on a `rows` x `cols` screen.
    Click {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// Returns whether the UI should re-render along with the actions, in order.
///
/// # Errors
///
/// Returns errors from filter validation. Recoverable conditions (location
/// failures, failed fetches, unknown selections, undecodable replies) are
/// absorbed into state and never surface here.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event.name()).entered();
    let mut actions = vec![];

    let render = match event {
        Event::Start => {
            if state.started {
                return Ok((false, actions));
            }
            state.started = true;
            tracing::info!(api_url = state.endpoint.base(), "starting discovery");

            if state.web_access {
                match state.endpoint.categories() {
                    Ok(call) => actions.push(Action::Http(call)),
                    Err(e) => tracing::warn!(error = %e, "cannot build categories request"),
                }
            }
            begin_location(state, &mut actions);
            true
        }
        Event::PermissionDenied => {
            if state.started {
                return Ok((false, actions));
            }
            state.started = true;
            state.web_access = false;
            tracing::warn!("web access denied");

            match state.resolver.resolve() {
                Some(request) => {
                    let resolution = state.resolver.on_failure(request.attempt, LocationFailure::PermissionDenied);
                    apply_resolution(state, resolution, &mut actions);
                }
                None => tracing::debug!("location already resolving"),
            }
            true
        }
        Event::CloseFocus => return Ok((false, vec![Action::CloseFocus])),

        Event::PositionFound { attempt, coordinate } => {
            let resolution = state.resolver.on_position(*attempt, *coordinate);
            apply_resolution(state, resolution, &mut actions)
        }
        Event::PositionFailed { attempt, failure } => {
            let resolution = state.resolver.on_failure(*attempt, failure.clone());
            apply_resolution(state, resolution, &mut actions)
        }
        Event::Timer => match state.pending_timers.pop_front() {
            Some(attempt) => {
                let resolution = state.resolver.on_timeout(attempt);
                apply_resolution(state, resolution, &mut actions)
            }
            None => false,
        },
        Event::RefreshLocation => {
            begin_location(state, &mut actions);
            true
        }

        Event::WebResponse { status, body, context } => {
            let context = match RequestContext::from_map(context) {
                Ok(context) => context,
                Err(e) => {
                    tracing::warn!(error = %e, status, "ignoring reply without a usable context");
                    return Ok((false, actions));
                }
            };

            let span = tracing::info_span!("web_response", kind = context.tag.kind(), status);
            if let Some(trace) = &context.trace {
                trace.set_as_parent_of(&span);
            }
            let _entered = span.enter();

            let decoded = decode_response(*status, body, &context);
            return handle_event(state, &decoded);
        }
        Event::EventsLoaded { generation, outcome } => {
            let completion = state.fetch.complete(*generation, outcome.clone());
            apply_completion(state, completion)
        }
        Event::CategoriesLoaded(Ok(entries)) => {
            tracing::debug!(count = entries.len(), "category metadata loaded");
            state.catalog = CategoryCatalog::new(entries.clone());

            let current = &state.filters.current().categories;
            let canonical = state.catalog.canonicalize(current);
            if &canonical == current {
                true
            } else {
                let change = state.filters.update(FilterPatch::new().categories(canonical))?;
                on_filter_change(state, &change, &mut actions);
                true
            }
        }
        Event::CategoriesLoaded(Err(e)) => {
            tracing::warn!(error = %e, "category metadata unavailable, using labels");
            false
        }
        Event::DetailLoaded { id, outcome } => match outcome {
            Ok(record) if state.selection.is_selected(id) && state.events().contains(id) => {
                tracing::debug!(id = %id, "event details loaded");
                state.detail = Some(record.clone());
                true
            }
            Ok(_) => {
                tracing::debug!(id = %id, "discarding details for an event no longer selected");
                false
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "event details unavailable");
                false
            }
        },
        Event::Retry => match state.fetch.retry() {
            Some(ticket) => {
                send_nearby(state, &ticket, &mut actions);
                true
            }
            None => {
                tracing::debug!("nothing to retry yet");
                request_fetch(state, &mut actions)
            }
        },
        Event::RequestDetail => match state.selection.current() {
            Some(_) if !state.web_access => false,
            Some(id) => {
                match state.endpoint.event_by_id(id) {
                    Ok(call) => actions.push(Action::Http(call)),
                    Err(e) => tracing::warn!(error = %e, "cannot build detail request"),
                }
                false
            }
            None => false,
        },

        Event::SearchMode => {
            tracing::debug!("entering search mode");
            state.input_mode = InputMode::Search;
            state.search_draft.clone_from(&state.filters.current().query);
            true
        }
        Event::Char(c) => {
            if state.input_mode != InputMode::Search {
                return Ok((false, actions));
            }
            state.search_draft.push(*c);
            tracing::trace!(draft = %state.search_draft, char = %c, "search draft updated");
            true
        }
        Event::Backspace => {
            if state.input_mode != InputMode::Search {
                return Ok((false, actions));
            }
            state.search_draft.pop();
            true
        }
        Event::ToggleCategory(index) => {
            let Some(category) = Category::SELECTABLE.get(*index).copied() else {
                return Ok((false, actions));
            };
            let id = state.catalog.id_for(category);
            let mut categories = state.filters.current().categories.clone();
            if !categories.remove(&id) {
                categories.insert(id);
            }
            let change = state.filters.update(FilterPatch::new().categories(categories))?;
            on_filter_change(state, &change, &mut actions)
        }
        Event::WidenRadius | Event::NarrowRadius => {
            let current = state.filters.current().max_distance_km;
            let widen = matches!(event, Event::WidenRadius);
            let next = if widen {
                (current + RADIUS_STEP_KM).min(MAX_RADIUS_KM)
            } else {
                (current - RADIUS_STEP_KM).max(MIN_RADIUS_KM)
            };
            // A configured radius outside the key range only moves towards it.
            let moved_wrong_way = if widen { next <= current } else { next >= current };
            if moved_wrong_way {
                return Ok((false, actions));
            }
            let change = state.filters.update(FilterPatch::new().max_distance_km(next))?;
            on_filter_change(state, &change, &mut actions)
        }
        Event::ClearFilters => {
            let change = state.filters.clear();
            on_filter_change(state, &change, &mut actions)
        }

        Event::Next | Event::Prev => {
            let forward = matches!(event, Event::Next);
            match state.focus {
                super::modes::Focus::List => {
                    if forward {
                        state.move_cursor_down();
                    } else {
                        state.move_cursor_up();
                    }
                    true
                }
                super::modes::Focus::Map => step_selection(state, forward),
            }
        }
        Event::Activate => {
            if state.input_mode == InputMode::Search {
                commit_search(state, &mut actions)?
            } else {
                match state.cursor_event().map(|event| event.id.clone()) {
                    Some(id) => select(state, Some(&id)),
                    None => false,
                }
            }
        }
        Event::Dismiss => {
            if state.input_mode == InputMode::Search {
                tracing::debug!(draft = %state.search_draft, "search draft discarded");
                state.input_mode = InputMode::Normal;
                state.search_draft.clear();
                true
            } else {
                select(state, None)
            }
        }
        Event::ToggleFocus => {
            state.focus = state.focus.toggled();
            true
        }
        Event::Click { row, col, rows, cols } => match state.hit_test(*row, *col, *rows, *cols) {
            Some(Hit::ListRow(index)) => {
                state.cursor = index;
                let id = state.cursor_event().map(|event| event.id.clone());
                select(state, id.as_deref());
                true
            }
            Some(Hit::Marker(id)) => select(state, Some(&id)),
            Some(Hit::ClosePopup) => select(state, None),
            None => false,
        },
    };

    Ok((render, actions))
}

impl Event {
    /// Variant name for span fields; payloads can be large.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PermissionDenied => "permission_denied",
            Self::CloseFocus => "close_focus",
            Self::PositionFound { .. } => "position_found",
            Self::PositionFailed { .. } => "position_failed",
            Self::Timer => "timer",
            Self::RefreshLocation => "refresh_location",
            Self::WebResponse { .. } => "web_response",
            Self::EventsLoaded { .. } => "events_loaded",
            Self::CategoriesLoaded(_) => "categories_loaded",
            Self::DetailLoaded { .. } => "detail_loaded",
            Self::Retry => "retry",
            Self::RequestDetail => "request_detail",
            Self::SearchMode => "search_mode",
            Self::Char(_) => "char",
            Self::Backspace => "backspace",
            Self::ToggleCategory(_) => "toggle_category",
            Self::WidenRadius => "widen_radius",
            Self::NarrowRadius => "narrow_radius",
            Self::ClearFilters => "clear_filters",
            Self::Next => "next",
            Self::Prev => "prev",
            Self::Activate => "activate",
            Self::Dismiss => "dismiss",
            Self::ToggleFocus => "toggle_focus",
            Self::Click { .. } => "click",
        }
    }
}

/// Starts a location attempt through the configured capability.
fn begin_location(state: &mut AppState, actions: &mut Vec<Action>) {
    let Some(request) = state.resolver.resolve() else {
        return;
    };

    let resolution = match state.config.location {
        LocationSource::Fixed(coordinate) => state.resolver.on_position(request.attempt, coordinate),
        LocationSource::Off => state.resolver.on_failure(request.attempt, LocationFailure::CapabilityMissing),
        LocationSource::Auto if !state.web_access => {
            state.resolver.on_failure(request.attempt, LocationFailure::PermissionDenied)
        }
        LocationSource::Auto => match geolocate(&state.config.geolocation_url, request.attempt) {
            Ok(call) => {
                actions.push(Action::Http(call));
                actions.push(Action::StartTimer(request.timeout));
                state.pending_timers.push_back(request.attempt);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "geolocation provider unusable");
                state.resolver.on_failure(request.attempt, LocationFailure::CapabilityMissing)
            }
        },
    };
    apply_resolution(state, resolution, actions);
}

/// Applies a settled location: re-frames the map and fetches for the new center.
fn apply_resolution(state: &mut AppState, resolution: Option<Resolution>, actions: &mut Vec<Action>) -> bool {
    let Some(resolution) = resolution else {
        return false;
    };
    state.recenter_map(resolution.coordinate);
    request_fetch(state, actions);
    true
}

fn on_filter_change(state: &mut AppState, change: &FilterChange, actions: &mut Vec<Action>) -> bool {
    tracing::debug!(
        revision = change.revision,
        active = change.filters.active_count(),
        radius_km = change.filters.max_distance_km,
        "filters changed"
    );
    request_fetch(state, actions);
    true
}

/// Issues a nearby fetch if a location has settled and the request key changed.
fn request_fetch(state: &mut AppState, actions: &mut Vec<Action>) -> bool {
    let Some(center) = state.resolver.coordinate() else {
        tracing::debug!("location not settled, fetch deferred");
        return false;
    };
    let Some(ticket) = state.fetch.request(center, state.filters.current()) else {
        return false;
    };
    send_nearby(state, &ticket, actions);
    true
}

/// Sends the ticket's query, or fails it on the spot when it cannot be sent.
fn send_nearby(state: &mut AppState, ticket: &FetchTicket, actions: &mut Vec<Action>) {
    if !state.web_access {
        let completion = state
            .fetch
            .complete(ticket.generation, Err(FetchError::Network("web access denied".to_string())));
        apply_completion(state, completion);
        return;
    }
    match state.endpoint.nearby(ticket) {
        Ok(call) => actions.push(Action::Http(call)),
        Err(e) => {
            let completion = state
                .fetch
                .complete(ticket.generation, Err(FetchError::Network(e.to_string())));
            apply_completion(state, completion);
        }
    }
}

fn apply_completion(state: &mut AppState, completion: Completion) -> bool {
    match completion {
        Completion::Stale => false,
        Completion::Replaced(events) => {
            state.selection.reconcile(&events);
            if state.detail.as_ref().is_some_and(|d| !state.selection.is_selected(&d.id)) {
                state.detail = None;
            }
            state.clamp_cursor();
            state.sync_cursor_to_selection();
            true
        }
        Completion::Failed(_) => true,
    }
}

fn commit_search(state: &mut AppState, actions: &mut Vec<Action>) -> Result<bool> {
    state.input_mode = InputMode::Normal;
    let draft = std::mem::take(&mut state.search_draft);
    if draft.trim() == state.filters.current().query.trim() {
        return Ok(true);
    }
    tracing::debug!(query = %draft, "search committed");
    let change = state.filters.update(FilterPatch::new().query(draft))?;
    Ok(on_filter_change(state, &change, actions))
}

/// Selects `id` and keeps the list cursor on it. Unknown ids are ignored.
fn select(state: &mut AppState, id: Option<&str>) -> bool {
    match state.selection.select(id, state.fetch.events()) {
        Ok(changed) => {
            if state.detail.as_ref().is_some_and(|d| !state.selection.is_selected(&d.id)) {
                state.detail = None;
            }
            state.sync_cursor_to_selection();
            changed
        }
        Err(e) => {
            tracing::debug!(error = %e, "selection ignored");
            false
        }
    }
}

/// Moves the selection to the next or previous event in result order.
fn step_selection(state: &mut AppState, forward: bool) -> bool {
    let events = state.events();
    let len = events.len();
    if len == 0 {
        return false;
    }

    let current = state.selection.current().and_then(|id| events.position(id));
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(pos), true) => (pos + 1) % len,
        (Some(pos), false) => (pos + len - 1) % len,
    };
    let id = events.as_slice()[next].id.clone();
    select(state, Some(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::modes::Focus;
    use crate::remote::RequestTag;
    use crate::ui::theme::Theme;
    use crate::Config;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, latitude: f64, longitude: f64) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            title: format!("Event {id}"),
            description: String::new(),
            location: Coordinate::new(latitude, longitude).unwrap(),
            address: String::new(),
            start_time: Utc.with_ymd_and_hms(2026, 10, 20, 18, 0, 0).unwrap(),
            end_time: None,
            category: Category::FreeFood,
            category_id: None,
            source: "community".to_string(),
            source_id: None,
            source_url: None,
            image_url: None,
            organizer_name: None,
            organizer_contact: None,
            capacity: None,
            is_verified: false,
            created_at: None,
            updated_at: None,
            distance_km: Some(1.0),
            score: None,
        }
    }

    fn fixed_state() -> AppState {
        let config = Config {
            location: LocationSource::Fixed(Coordinate::new(40.7128, -74.006).unwrap()),
            ..Config::default()
        };
        AppState::new(config, Theme::default())
    }

    fn nearby_generations(actions: &[Action]) -> Vec<u64> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Http(call) => match call.context.tag {
                    RequestTag::Nearby { generation } => Some(generation),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn loaded(state: &mut AppState, events: Vec<EventRecord>) {
        let generation = state.fetch.generation();
        handle_event(state, &Event::EventsLoaded { generation, outcome: Ok(events) }).unwrap();
    }

    #[test]
    fn auto_location_waits_for_the_provider() {
        let mut state = AppState::new(Config::default(), Theme::default());
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();

        assert!(nearby_generations(&actions).is_empty());
        assert!(actions.contains(&Action::StartTimer(state.config.location_timeout)));
        assert_eq!(state.pending_timers.len(), 1);

        // Timer fires first: fallback plus one fetch; the late answer is ignored.
        let (_, actions) = handle_event(&mut state, &Event::Timer).unwrap();
        assert_eq!(nearby_generations(&actions), vec![1]);
        assert_eq!(state.resolver.coordinate(), Some(state.config.fallback));

        let late = Event::PositionFound { attempt: 1, coordinate: Coordinate::new(1.0, 1.0).unwrap() };
        let (render, actions) = handle_event(&mut state, &late).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn filter_edits_before_location_do_not_fetch() {
        let mut state = AppState::new(Config::default(), Theme::default());
        handle_event(&mut state, &Event::Start).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::WidenRadius).unwrap();
        assert!(nearby_generations(&actions).is_empty());

        let found = Event::PositionFound { attempt: 1, coordinate: Coordinate::new(40.0, -74.0).unwrap() };
        let (_, actions) = handle_event(&mut state, &found).unwrap();
        assert_eq!(nearby_generations(&actions), vec![1]);
        assert_eq!(state.fetch.last_query().unwrap().max_distance_km, 55.0);
    }

    #[test]
    fn radius_keys_clamp() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        for _ in 0..20 {
            handle_event(&mut state, &Event::WidenRadius).unwrap();
        }
        assert_eq!(state.filters.current().max_distance_km, MAX_RADIUS_KM);

        let (render, actions) = handle_event(&mut state, &Event::WidenRadius).unwrap();
        assert!(!render);
        assert!(actions.is_empty());

        for _ in 0..30 {
            handle_event(&mut state, &Event::NarrowRadius).unwrap();
        }
        assert_eq!(state.filters.current().max_distance_km, MIN_RADIUS_KM);
    }

    #[test]
    fn category_toggle_round_trip_refetches_once_each() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();

        let (_, on) = handle_event(&mut state, &Event::ToggleCategory(0)).unwrap();
        assert_eq!(nearby_generations(&on), vec![2]);
        assert!(state.filters.current().categories.contains("Free Food"));

        let (_, off) = handle_event(&mut state, &Event::ToggleCategory(0)).unwrap();
        assert_eq!(nearby_generations(&off), vec![3]);
        assert!(state.filters.current().categories.is_empty());

        let (render, none) = handle_event(&mut state, &Event::ToggleCategory(42)).unwrap();
        assert!(!render);
        assert!(none.is_empty());
    }

    #[test]
    fn categories_metadata_remaps_selected_labels() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        handle_event(&mut state, &Event::ToggleCategory(0)).unwrap();

        let entries = vec![CategoryInfo {
            id: "cat-food".to_string(),
            name: "Free Food".to_string(),
            description: String::new(),
            icon: String::new(),
        }];
        let (_, actions) = handle_event(&mut state, &Event::CategoriesLoaded(Ok(entries))).unwrap();

        assert!(state.filters.current().categories.contains("cat-food"));
        assert_eq!(nearby_generations(&actions), vec![3]);
    }

    #[test]
    fn search_draft_commits_on_enter_and_discards_on_esc() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();

        handle_event(&mut state, &Event::SearchMode).unwrap();
        for c in "pizza".chars() {
            let (_, actions) = handle_event(&mut state, &Event::Char(c)).unwrap();
            assert!(actions.is_empty());
        }
        let (_, actions) = handle_event(&mut state, &Event::Activate).unwrap();
        assert_eq!(state.filters.current().query, "pizza");
        assert_eq!(nearby_generations(&actions), vec![2]);

        handle_event(&mut state, &Event::SearchMode).unwrap();
        assert_eq!(state.search_draft, "pizza");
        handle_event(&mut state, &Event::Backspace).unwrap();
        handle_event(&mut state, &Event::Dismiss).unwrap();
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(state.filters.current().query, "pizza");
    }

    #[test]
    fn map_focus_steps_the_selection() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        loaded(&mut state, vec![record("a", 40.71, -74.0), record("b", 40.72, -74.0)]);

        handle_event(&mut state, &Event::ToggleFocus).unwrap();
        assert_eq!(state.focus, Focus::Map);

        let (_, actions) = handle_event(&mut state, &Event::Next).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.selection.current(), Some("a"));
        handle_event(&mut state, &Event::Next).unwrap();
        assert_eq!(state.selection.current(), Some("b"));
        assert_eq!(state.cursor, 1);
        let (_, actions) = handle_event(&mut state, &Event::Prev).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.selection.current(), Some("a"));

        let (_, actions) = handle_event(&mut state, &Event::Dismiss).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.selection.current(), None);
    }

    #[test]
    fn selection_changes_never_fetch() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        loaded(&mut state, vec![record("a", 40.71, -74.0), record("b", 40.72, -74.0)]);
        let generation = state.fetch.generation();

        let list_row_b = Event::Click { row: 6, col: 5, rows: 40, cols: 120 };
        let events = [
            Event::Activate,
            Event::Next,
            Event::Activate,
            Event::Dismiss,
            list_row_b,
            Event::ToggleFocus,
            Event::Next,
            Event::Prev,
            Event::Dismiss,
        ];
        for event in &events {
            let (_, actions) = handle_event(&mut state, event).unwrap();
            assert!(actions.is_empty(), "{} issued {actions:?}", event.name());
        }

        assert_eq!(state.fetch.generation(), generation);
        assert!(matches!(state.fetch.status(), crate::engine::FetchStatus::Succeeded(_)));
    }

    #[test]
    fn clicking_a_list_row_selects_it() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        loaded(&mut state, vec![record("a", 40.71, -74.0), record("b", 40.72, -74.0)]);

        let (render, _) = handle_event(&mut state, &Event::Click { row: 6, col: 5, rows: 40, cols: 120 }).unwrap();
        assert!(render);
        assert_eq!(state.selection.current(), Some("b"));
        assert_eq!(state.cursor, 1);
    }

    #[test]
    fn denied_web_access_fails_fetches_without_sending() {
        let mut state = AppState::new(Config::default(), Theme::default());
        let (render, actions) = handle_event(&mut state, &Event::PermissionDenied).unwrap();
        assert!(render);
        assert!(actions.is_empty());
        assert!(!state.web_access);
        assert_eq!(state.resolver.coordinate(), Some(state.config.fallback));
        assert!(matches!(state.fetch.status(), crate::engine::FetchStatus::Failed(_)));

        let vm = state.compute_viewmodel(40, 120);
        assert!(vm.header.status.starts_with("Location access denied"));
        assert!(vm.list.error.is_some());

        for event in [Event::Retry, Event::RefreshLocation, Event::WidenRadius] {
            let (_, actions) = handle_event(&mut state, &event).unwrap();
            assert!(actions.is_empty(), "{} issued {actions:?}", event.name());
            assert!(!state.fetch.is_loading());
        }
        assert!(matches!(state.fetch.status(), crate::engine::FetchStatus::Failed(_)));
    }

    #[test]
    fn configured_radius_outside_key_range_only_moves_inward() {
        let mut small = AppState::new(
            Config {
                max_distance_km: 0.5,
                ..fixed_state().config
            },
            Theme::default(),
        );
        handle_event(&mut small, &Event::Start).unwrap();
        let (render, actions) = handle_event(&mut small, &Event::NarrowRadius).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
        assert_eq!(small.filters.current().max_distance_km, 0.5);

        handle_event(&mut small, &Event::WidenRadius).unwrap();
        assert_eq!(small.filters.current().max_distance_km, 5.5);

        let mut large = AppState::new(
            Config {
                max_distance_km: 150.0,
                ..fixed_state().config
            },
            Theme::default(),
        );
        handle_event(&mut large, &Event::Start).unwrap();
        let (render, _) = handle_event(&mut large, &Event::WidenRadius).unwrap();
        assert!(!render);
        assert_eq!(large.filters.current().max_distance_km, 150.0);
        handle_event(&mut large, &Event::NarrowRadius).unwrap();
        assert_eq!(large.filters.current().max_distance_km, 145.0);
    }

    #[test]
    fn search_replies_share_the_fetch_generation() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        let generation = state.fetch.generation();
        let body = serde_json::to_vec(&vec![record("s", 40.71, -74.0)]).unwrap();

        let old = state.endpoint.search(generation - 1, "pizza").unwrap();
        let reply = Event::WebResponse { status: 200, body: body.clone(), context: old.context.to_map() };
        let (render, _) = handle_event(&mut state, &reply).unwrap();
        assert!(!render);
        assert!(state.fetch.is_loading());

        let current = state.endpoint.search(generation, "pizza").unwrap();
        let reply = Event::WebResponse { status: 200, body, context: current.context.to_map() };
        handle_event(&mut state, &reply).unwrap();
        assert!(state.events().contains("s"));
    }

    #[test]
    fn stale_details_are_dropped() {
        let mut state = fixed_state();
        handle_event(&mut state, &Event::Start).unwrap();
        loaded(&mut state, vec![record("a", 40.71, -74.0), record("b", 40.72, -74.0)]);

        handle_event(&mut state, &Event::Activate).unwrap();
        let (_, actions) = handle_event(&mut state, &Event::RequestDetail).unwrap();
        assert_eq!(actions.len(), 1);

        handle_event(&mut state, &Event::Next).unwrap();
        handle_event(&mut state, &Event::Activate).unwrap();
        assert_eq!(state.selection.current(), Some("b"));

        let mut detail = record("a", 40.71, -74.0);
        detail.organizer_name = Some("Student Union".to_string());
        let (render, _) = handle_event(&mut state, &Event::DetailLoaded { id: "a".to_string(), outcome: Ok(detail) }).unwrap();
        assert!(!render);
        assert!(state.detail.is_none());
    }

    #[test]
    fn replies_with_broken_context_are_ignored() {
        let mut state = fixed_state();
        let event = Event::WebResponse { status: 200, body: b"[]".to_vec(), context: BTreeMap::new() };
        let (render, actions) = handle_event(&mut state, &event).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn web_replies_route_by_context() {
        let mut state = fixed_state();
        let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
        let Some(Action::Http(call)) = actions
            .iter()
            .find(|a| matches!(a, Action::Http(c) if matches!(c.context.tag, RequestTag::Nearby { .. })))
        else {
            panic!("no nearby request issued");
        };

        let reply = Event::WebResponse { status: 500, body: Vec::new(), context: call.context.to_map() };
        handle_event(&mut state, &reply).unwrap();
        assert!(matches!(state.fetch.status(), crate::engine::FetchStatus::Failed(_)));
    }
}
