//! View model types representing renderable UI state.
//!
//! View models are computed by `AppState::compute_viewmodel()` from one
//! snapshot of (events, selection, filters) and consumed by the renderer and by
//! mouse hit testing. They contain no business logic, only display-ready data,
//! so the list and the map can never disagree about what is selected.

use super::layout::{Rect, ScreenLayout};
use crate::domain::{Category, Coordinate};

/// Complete UI view model for rendering.
#[derive(Debug, Clone)]
pub struct UIViewModel {
    pub layout: ScreenLayout,
    pub header: HeaderInfo,
    pub footer: FooterInfo,
    /// Present while the search draft is being edited.
    pub search_bar: Option<SearchBarInfo>,
    pub list: ListViewModel,
    /// `None` when the screen is too narrow for the map pane.
    pub map: Option<MapViewModel>,
    /// Detail popup for the selected event.
    pub popup: Option<PopupInfo>,
}

/// Severity of the header status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Normal,
    Busy,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
    /// Location and load status, e.g. "Showing 12 events".
    pub status: String,
    pub tone: StatusTone,
    /// One-line summary of radius, categories and query.
    pub filters: String,
    /// Badge count of active restrictions; zero hides the badge.
    pub active_filters: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    pub keybindings: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub draft: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

/// The list pane.
#[derive(Debug, Clone, PartialEq)]
pub struct ListViewModel {
    /// Visible window of rows, in result order.
    pub items: Vec<ListItem>,
    /// Index in the event set of `items[0]`.
    pub window_start: usize,
    pub total: usize,
    /// First terminal row used by `items`, below the error panel if shown.
    pub items_top: usize,
    pub error: Option<ErrorPanel>,
    pub empty_state: Option<EmptyState>,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub message: String,
    pub hint: String,
}

/// One list row (two terminal lines).
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub glyph: char,
    /// "Free Food · Today • 6:00 PM · 1.2 km"
    pub subtitle: String,
    pub starting_soon: bool,
    pub is_selected: bool,
    pub is_cursor: bool,
    /// Character ranges of `title` matching the text query.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// The map pane.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewModel {
    pub title: String,
    /// Drawing area below the map title line.
    pub canvas: Rect,
    pub center: Coordinate,
    pub radius_km: f64,
    /// Canvas cells on the search-radius circle.
    pub ring: Vec<(usize, usize)>,
    /// Cell of the user's resolved position, if on the canvas.
    pub user: Option<(usize, usize)>,
    pub markers: Vec<MarkerDescriptor>,
    pub focused: bool,
}

impl MapViewModel {
    /// The marker drawn at a terminal cell. Later markers are drawn on top,
    /// and the selected marker is drawn last.
    #[must_use]
    pub fn marker_at(&self, row: usize, col: usize) -> Option<&MarkerDescriptor> {
        if !self.canvas.contains(row, col) {
            return None;
        }
        let cell = (col - self.canvas.col, row - self.canvas.row);
        self.markers
            .iter()
            .filter(|m| m.cell == Some(cell))
            .max_by_key(|m| m.selected)
    }
}

/// One event as the map sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub id: String,
    pub location: Coordinate,
    pub category: Category,
    pub selected: bool,
    /// Canvas cell, `None` when outside the framed area.
    pub cell: Option<(usize, usize)>,
}

/// Detail popup content for the selected event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupInfo {
    pub id: String,
    pub title: String,
    pub category: String,
    pub when: String,
    pub address: String,
    /// At most 150 characters, "..." appended when cut.
    pub description: String,
    /// "1.2 km away"
    pub distance: Option<String>,
    pub source_url: Option<String>,
    /// Lines only known after a detail lookup (organizer, capacity).
    pub extra: Vec<String>,
    pub verified: bool,
}
