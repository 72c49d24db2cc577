//! Event list renderer.
//!
//! Each event takes two lines:
//!
//! ```text
//! ▌F Pizza on the quad                  Starting soon
//! ▌  Free Food · Today • 6:00 PM · 1.2 km
//! ```
//!
//! The bar marks the selected event; the cursor row is drawn with the
//! selection colors while the list has focus.

use crate::ui::helpers::{self, display_width, fit, fit_padded, position_cursor};
use crate::ui::layout::Rect;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{ErrorPanel, ListItem, ListViewModel};

const SOON_BADGE: &str = "Starting soon";

/// Renders the list pane into `area`.
pub fn render_list(area: Rect, list: &ListViewModel, theme: &Theme) {
    if let Some(error) = &list.error {
        render_error_panel(area, error, theme);
    }

    let mut row = list.items_top;
    for item in &list.items {
        if row + 1 > area.bottom() {
            break;
        }
        render_item(row, area, item, list.focused, theme);
        row += 2;
    }
}

fn render_error_panel(area: Rect, error: &ErrorPanel, theme: &Theme) {
    position_cursor(area.row, area.col);
    print!("{}{}", Theme::bold(), Theme::fg(&theme.colors.error_fg));
    print!("{}", fit_padded(&format!(" ✗ {}", error.message), area.width));
    print!("{}", Theme::reset());

    position_cursor(area.row + 1, area.col);
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{}", fit_padded(&format!("   {}", error.hint), area.width));
    print!("{}", Theme::reset());
}

fn render_item(row: usize, area: Rect, item: &ListItem, focused: bool, theme: &Theme) {
    let highlighted = item.is_cursor && focused;
    let base = if highlighted {
        format!("{}{}", Theme::fg(&theme.colors.selection_fg), Theme::bg(&theme.colors.selection_bg))
    } else {
        Theme::fg(&theme.colors.text_normal)
    };

    // Gutter (1) + glyph (1) + space (1).
    let gutter = if item.is_selected { "▌" } else { " " };
    let badge_width = if item.starting_soon { display_width(SOON_BADGE) + 1 } else { 0 };
    let title_width = area.width.saturating_sub(3 + badge_width);

    position_cursor(row, area.col);
    print!("{base}");
    if item.is_selected && !highlighted {
        print!("{}{gutter}{base}", Theme::fg(&theme.colors.marker_selected_fg));
    } else {
        print!("{gutter}");
    }
    print!("{} ", item.glyph);
    if item.is_selected {
        print!("{}", Theme::bold());
    }
    helpers::render_highlighted_text(&item.title, &item.highlight_ranges, theme, highlighted, title_width, &base);
    let title_len = display_width(&fit(&item.title, title_width));
    print!("{}", " ".repeat(title_width.saturating_sub(title_len)));
    if item.starting_soon {
        print!(" {}{SOON_BADGE}", Theme::fg(&theme.colors.badge_fg));
    }
    print!("{}", Theme::reset());

    position_cursor(row + 1, area.col);
    print!("{base}{}", Theme::dim());
    print!("{}", fit_padded(&format!("{gutter}  {}", item.subtitle), area.width));
    print!("{}", Theme::reset());
}
