//! Empty state component renderer.

use crate::ui::helpers::{display_width, fit, position_cursor};
use crate::ui::layout::Rect;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::EmptyState;

/// Renders the two-line empty state message centered in `area`.
///
/// ```text
/// [blank lines]
///        No events found
///  Try adjusting your filters or search radius
/// ```
pub fn render_empty_state(area: Rect, empty: &EmptyState, theme: &Theme) {
    let top = area.row + area.height.saturating_sub(2) / 3;

    let message = fit(&empty.message, area.width);
    let msg_padding = area.width.saturating_sub(display_width(&message)) / 2;

    position_cursor(top, area.col + msg_padding);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.empty_state_fg));
    print!("{message}");
    print!("{}", Theme::reset());

    let subtitle = fit(&empty.subtitle, area.width);
    let sub_padding = area.width.saturating_sub(display_width(&subtitle)) / 2;

    position_cursor(top + 1, area.col + sub_padding);
    print!("{}", Theme::dim());
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{subtitle}");
    print!("{}", Theme::reset());
}
