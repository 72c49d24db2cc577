//! Application state management and view model computation.
//!
//! [`AppState`] owns one instance of each engine component plus the purely
//! presentational state (input mode, focus, list cursor, map viewport). Only
//! the event handler mutates it; renderers receive a [`UIViewModel`] computed
//! from a single snapshot, so list and map always agree on the event set and
//! the selection.

use super::modes::{Focus, InputMode};
use crate::domain::{CategoryCatalog, Coordinate, EventRecord, FilterState};
use crate::engine::{
    EventSet, FetchController, FetchStatus, LocationFailure, LocationResolver, LocationStatus, QueryStore,
    SelectionCoordinator,
};
use crate::remote::Endpoint;
use crate::ui::layout::{ScreenLayout, ERROR_PANEL_ROWS, LIST_ITEM_ROWS};
use crate::ui::map::{is_material_move, Projection};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{
    EmptyState, ErrorPanel, FooterInfo, HeaderInfo, ListItem, ListViewModel, MapViewModel,
    MarkerDescriptor, PopupInfo, SearchBarInfo, StatusTone, UIViewModel,
};
use crate::Config;
use chrono::{DateTime, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use std::collections::VecDeque;

/// Events starting within this window get a "Starting soon" badge.
const STARTING_SOON_HOURS: i64 = 2;

/// Popup descriptions are cut to this many characters.
const POPUP_DESCRIPTION_CHARS: usize = 150;

/// What a mouse click landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// A list row, by index into the event set.
    ListRow(usize),
    Marker(String),
    ClosePopup,
}

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub theme: Theme,
    pub endpoint: Endpoint,

    pub resolver: LocationResolver,
    pub filters: QueryStore,
    pub fetch: FetchController,
    pub selection: SelectionCoordinator,

    /// Category metadata; empty until `GET /categories` answers.
    pub catalog: CategoryCatalog,

    /// Result of the last detail lookup. Only shown while its id is selected.
    pub detail: Option<EventRecord>,

    pub input_mode: InputMode,
    pub focus: Focus,

    /// Search text being edited; committed to the filters with Enter.
    pub search_draft: String,

    /// Zero-based list cursor into the current event set.
    pub cursor: usize,

    /// Map viewport center. Moves only when the resolved position moves
    /// materially.
    pub map_center: Option<Coordinate>,

    /// Location attempts that armed a host timer, oldest first.
    pub pending_timers: VecDeque<u64>,

    /// Set once permissions were answered and startup requests went out.
    pub started: bool,

    /// Cleared when the host refuses web access; the host drops requests
    /// sent without it, so none are issued.
    pub web_access: bool,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, theme: Theme) -> Self {
        let filters = FilterState {
            max_distance_km: config.max_distance_km,
            ..FilterState::default()
        };

        Self {
            endpoint: Endpoint::new(&config.api_url),
            resolver: LocationResolver::new(config.fallback, config.location_timeout),
            filters: QueryStore::new(filters),
            fetch: FetchController::new(config.limit),
            selection: SelectionCoordinator::new(),
            catalog: CategoryCatalog::default(),
            detail: None,
            input_mode: InputMode::Normal,
            focus: Focus::List,
            search_draft: String::new(),
            cursor: 0,
            map_center: None,
            pending_timers: VecDeque::new(),
            started: false,
            web_access: true,
            config,
            theme,
        }
    }

    /// The event set currently on screen.
    #[must_use]
    pub const fn events(&self) -> &EventSet {
        self.fetch.events()
    }

    /// Moves the list cursor down by one position, wrapping to the top.
    pub fn move_cursor_down(&mut self) {
        let len = self.events().len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor + 1) % len;
    }

    /// Moves the list cursor up by one position, wrapping to the bottom.
    pub fn move_cursor_up(&mut self) {
        let len = self.events().len();
        if len == 0 {
            return;
        }
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
    }

    #[must_use]
    pub fn cursor_event(&self) -> Option<&EventRecord> {
        self.events().as_slice().get(self.cursor)
    }

    /// Keeps the cursor inside the current event set.
    pub fn clamp_cursor(&mut self) {
        let len = self.events().len();
        self.cursor = if len == 0 { 0 } else { self.cursor.min(len - 1) };
    }

    /// Moves the cursor onto the selected event, if any.
    pub fn sync_cursor_to_selection(&mut self) {
        if let Some(pos) = self.selection.current().and_then(|id| self.events().position(id)) {
            self.cursor = pos;
        }
    }

    /// Re-centers the map on `candidate` if it moved materially.
    ///
    /// Returns whether the viewport changed.
    pub fn recenter_map(&mut self, candidate: Coordinate) -> bool {
        if !is_material_move(self.map_center, candidate) {
            return false;
        }
        tracing::debug!(center = %candidate, "map re-centered");
        self.map_center = Some(candidate);
        true
    }

    /// Computes a renderable UI view model from current state and terminal dimensions.
    #[must_use]
    pub fn compute_viewmodel(&self, rows: usize, cols: usize) -> UIViewModel {
        self.compute_viewmodel_at(rows, cols, Utc::now())
    }

    /// [`Self::compute_viewmodel`] with an explicit clock, for relative dates.
    #[must_use]
    pub fn compute_viewmodel_at(&self, rows: usize, cols: usize, now: DateTime<Utc>) -> UIViewModel {
        let selected = self.selection.selected(self.events());
        let layout = ScreenLayout::compute(
            rows,
            cols,
            self.input_mode == InputMode::Search,
            selected.is_some(),
        );

        UIViewModel {
            header: self.compute_header(),
            footer: self.compute_footer(),
            search_bar: self.compute_search_bar(),
            list: self.compute_list(&layout, now),
            map: self.compute_map(&layout),
            popup: selected.map(|event| self.compute_popup(event, now)),
            layout,
        }
    }

    /// Resolves a click at a 1-indexed terminal cell.
    #[must_use]
    pub fn hit_test(&self, row: usize, col: usize, rows: usize, cols: usize) -> Option<Hit> {
        let vm = self.compute_viewmodel(rows, cols);

        if let Some(popup) = vm.layout.popup {
            if vm.layout.close_control().is_some_and(|close| close.contains(row, col)) {
                return Some(Hit::ClosePopup);
            }
            if popup.contains(row, col) {
                return None;
            }
        }

        if let Some(marker) = vm.map.as_ref().and_then(|map| map.marker_at(row, col)) {
            return Some(Hit::Marker(marker.id.clone()));
        }

        let list = vm.layout.list;
        if list.contains(row, col) && row >= vm.list.items_top {
            let offset = (row - vm.list.items_top) / LIST_ITEM_ROWS;
            if offset < vm.list.items.len() {
                return Some(Hit::ListRow(vm.list.window_start + offset));
            }
        }
        None
    }

    fn compute_header(&self) -> HeaderInfo {
        let (status, tone) = self.compute_status();
        let current = self.filters.current();

        let mut parts = vec![format!("Radius: {} km", current.max_distance_km)];
        if !current.categories.is_empty() {
            let labels: Vec<String> = current
                .categories
                .iter()
                .map(|id| self.catalog.label_for(id))
                .collect();
            parts.push(format!("Categories: {}", labels.join(", ")));
        }
        if !current.query.trim().is_empty() {
            parts.push(format!("Query: \"{}\"", current.query.trim()));
        }

        HeaderInfo {
            title: " ZeroCost ".to_string(),
            status,
            tone,
            filters: parts.join("  │  "),
            active_filters: current.active_count(),
        }
    }

    fn compute_status(&self) -> (String, StatusTone) {
        match self.resolver.status() {
            LocationStatus::Idle | LocationStatus::Resolving if self.resolver.coordinate().is_none() => {
                return ("Getting your location...".to_string(), StatusTone::Busy);
            }
            LocationStatus::Unavailable(failure) if !self.fetch.is_loading() => {
                let reason = match failure {
                    LocationFailure::PermissionDenied => "Location access denied",
                    _ => "Location unavailable",
                };
                return (
                    format!("{reason} - showing default area  ·  {}", showing(self.events().len())),
                    StatusTone::Warning,
                );
            }
            _ => {}
        }

        match self.fetch.status() {
            FetchStatus::Idle => ("Waiting for location...".to_string(), StatusTone::Busy),
            FetchStatus::Loading => ("Loading events...".to_string(), StatusTone::Busy),
            FetchStatus::Succeeded(set) => (showing(set.len()), StatusTone::Normal),
            FetchStatus::Failed(message) => (message.clone(), StatusTone::Error),
        }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = match (self.input_mode, self.focus) {
            (InputMode::Search, _) => "Enter: apply  Esc: cancel  Type to search".to_string(),
            (InputMode::Normal, Focus::List) => {
                "j/k: move  Enter: select  Tab: map  /: search  1-8: category  +/-: radius  C: clear  r: retry  L: locate  d: details  q: quit".to_string()
            }
            (InputMode::Normal, Focus::Map) => {
                "n/p: next/prev marker  Esc: close popup  Tab: list  d: details  r: retry  L: locate  q: quit".to_string()
            }
        };
        FooterInfo { keybindings }
    }

    fn compute_search_bar(&self) -> Option<SearchBarInfo> {
        (self.input_mode == InputMode::Search).then(|| SearchBarInfo {
            draft: self.search_draft.clone(),
        })
    }

    fn compute_list(&self, layout: &ScreenLayout, now: DateTime<Utc>) -> ListViewModel {
        let events = self.events();

        let error = match self.fetch.status() {
            FetchStatus::Failed(message) => Some(ErrorPanel {
                message: message.clone(),
                hint: "Press r to retry".to_string(),
            }),
            _ => None,
        };
        let error_rows = if error.is_some() { ERROR_PANEL_ROWS } else { 0 };
        let items_top = layout.list.row + error_rows;

        let empty_state = (events.is_empty() && matches!(self.fetch.status(), FetchStatus::Succeeded(_)))
            .then(|| EmptyState {
                message: "No events found".to_string(),
                subtitle: "Try adjusting your filters or search radius".to_string(),
            });

        let capacity = layout.list.height.saturating_sub(error_rows) / LIST_ITEM_ROWS;
        let mut window_start = self.cursor.saturating_sub(capacity / 2);
        let window_end = (window_start + capacity).min(events.len());
        if window_end - window_start < capacity && events.len() >= capacity {
            window_start = window_end.saturating_sub(capacity);
        }

        let matcher = (!self.filters.current().query.trim().is_empty()).then(SkimMatcherV2::default);

        let items = events.as_slice()[window_start..window_end]
            .iter()
            .enumerate()
            .map(|(offset, event)| self.compute_list_item(event, window_start + offset, now, matcher.as_ref()))
            .collect();

        ListViewModel {
            items,
            window_start,
            total: events.len(),
            items_top,
            error,
            empty_state,
            focused: self.focus == Focus::List,
        }
    }

    fn compute_list_item(
        &self,
        event: &EventRecord,
        index: usize,
        now: DateTime<Utc>,
        matcher: Option<&SkimMatcherV2>,
    ) -> ListItem {
        let mut subtitle = vec![event.category.label().to_string(), format_when(event.start_time, now)];
        if let Some(km) = event.distance_km {
            subtitle.push(format!("{km:.1} km"));
        }

        ListItem {
            id: event.id.clone(),
            title: event.title.clone(),
            glyph: event.category.glyph(),
            subtitle: subtitle.join(" · "),
            starting_soon: event.starts_within(now, chrono::Duration::hours(STARTING_SOON_HOURS)),
            is_selected: self.selection.is_selected(&event.id),
            is_cursor: index == self.cursor,
            highlight_ranges: matcher.map_or_else(Vec::new, |m| self.compute_highlight_ranges(&event.title, m)),
        }
    }

    /// Character ranges of `text` matched by the committed query.
    ///
    /// Purely visual: the result set itself is never filtered locally.
    fn compute_highlight_ranges(&self, text: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
        use fuzzy_matcher::FuzzyMatcher;

        let Some((_score, indices)) = matcher.fuzzy_indices(text, self.filters.current().query.trim()) else {
            return vec![];
        };

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for idx in indices {
            match ranges.last_mut() {
                Some((_, end)) if *end == idx => *end = idx + 1,
                _ => ranges.push((idx, idx + 1)),
            }
        }
        ranges
    }

    fn compute_map(&self, layout: &ScreenLayout) -> Option<MapViewModel> {
        let pane = layout.map?;
        let center = self.map_center.unwrap_or_else(|| self.resolver.fallback());
        let radius_km = self.filters.current().max_distance_km;

        let canvas = crate::ui::layout::Rect::new(pane.row + 1, pane.col, pane.width, pane.height.saturating_sub(1));
        let projection = Projection::framing(center, radius_km, canvas.width, canvas.height);

        let mut markers: Vec<MarkerDescriptor> = self
            .events()
            .iter()
            .map(|event| MarkerDescriptor {
                id: event.id.clone(),
                location: event.location,
                category: event.category,
                selected: self.selection.is_selected(&event.id),
                cell: projection.project(event.location),
            })
            .collect();
        markers.sort_by_key(|m| m.selected);

        Some(MapViewModel {
            title: format!("Map · {radius_km} km around {center}"),
            canvas,
            center,
            radius_km,
            ring: projection.ring(radius_km),
            user: self.resolver.coordinate().and_then(|c| projection.project(c)),
            markers,
            focused: self.focus == Focus::Map,
        })
    }

    fn compute_popup(&self, event: &EventRecord, now: DateTime<Utc>) -> PopupInfo {
        let detail = self.detail.as_ref().filter(|d| d.id == event.id);
        let source = detail.unwrap_or(event);

        let mut extra = Vec::new();
        if let Some(name) = &source.organizer_name {
            extra.push(format!("by {name}"));
        }
        if let Some(contact) = &source.organizer_contact {
            extra.push(format!("contact: {contact}"));
        }
        if let Some(capacity) = source.capacity {
            extra.push(format!("capacity: {capacity}"));
        }

        PopupInfo {
            id: event.id.clone(),
            title: event.title.clone(),
            category: event.category.label().to_string(),
            when: format_when(event.start_time, now),
            address: event.address.clone(),
            description: truncate_chars(&source.description, POPUP_DESCRIPTION_CHARS),
            distance: event.distance_km.map(|km| format!("{km:.1} km away")),
            source_url: source.source_url.clone(),
            extra,
            verified: source.is_verified,
        }
    }
}

fn showing(count: usize) -> String {
    match count {
        1 => "Showing 1 event".to_string(),
        n => format!("Showing {n} events"),
    }
}

/// "Today • 6:00 PM" for events today, "Oct 21, 2026 • 6:00 PM" otherwise.
fn format_when(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day = if start.date_naive() == now.date_naive() {
        "Today".to_string()
    } else {
        start.format("%b %-d, %Y").to_string()
    };
    format!("{day} • {}", start.format("%-I:%M %p"))
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
