//! Composable UI component renderers.
//!
//! # Components
//!
//! - [`header`]: Title, status and filter summary
//! - [`search`]: Search input box
//! - [`list`]: Event list with error panel
//! - [`map`]: Terminal map with markers and radius ring
//! - [`popup`]: Detail popup for the selected event
//! - [`empty`]: Empty state message
//! - [`footer`]: Keybinding hints
//!
//! All components draw inside the rectangles of [`ScreenLayout`], the same
//! geometry mouse clicks are resolved against.
//!
//! [`ScreenLayout`]: crate::ui::layout::ScreenLayout

mod empty;
mod footer;
mod header;
mod list;
mod map;
mod popup;
mod search;

pub use empty::render_empty_state;

use crate::ui::helpers::position_cursor;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::UIViewModel;

use footer::render_footer;
use header::render_header;
use list::render_list;
use map::render_map;
use popup::render_popup;
use search::render_search_bar;

/// Renders a horizontal border line at `row`. Returns the next row.
fn render_border(row: usize, color: &str, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", "─".repeat(cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Vertical separator between the list and map panes.
fn render_divider(col: usize, top: usize, height: usize, color: &str) {
    print!("{}", Theme::fg(color));
    for row in top..top + height {
        position_cursor(row, col);
        print!("│");
    }
    print!("{}", Theme::reset());
}

/// Renders a full frame.
///
/// ```text
/// [Header: title, status]
/// [Header: filters, badge]
/// [Border]
/// [Search Bar - 3 lines, while searching]
/// [List] │ [Map]
///        │ [Popup over the bottom of the map]
/// [Border]
/// [Footer]
/// ```
pub fn render_screen(vm: &UIViewModel, theme: &Theme) {
    let layout = &vm.layout;
    if layout.rows < 4 || layout.cols == 0 {
        return;
    }

    let row = render_header(layout.header, &vm.header, theme);
    render_border(row, &theme.colors.border, layout.cols);

    if let (Some(area), Some(search)) = (layout.search, &vm.search_bar) {
        render_search_bar(area, search, theme);
    }

    render_list(layout.list, &vm.list, theme);
    if let Some(empty) = &vm.list.empty_state {
        render_empty_state(layout.list, empty, theme);
    }

    if let (Some(area), Some(map)) = (layout.map, &vm.map) {
        render_divider(area.col - 1, area.row, area.height, &theme.colors.border);
        render_map(area, map, theme);
    }

    if let (Some(area), Some(popup)) = (layout.popup, &vm.popup) {
        render_popup(area, popup, theme);
    }

    render_border(layout.footer_row - 1, &theme.colors.border, layout.cols);
    render_footer(layout.footer_row, &vm.footer, theme, layout.cols);
}
