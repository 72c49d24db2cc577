//! Search bar component renderer.

use crate::ui::helpers::{fit_padded, position_cursor};
use crate::ui::layout::Rect;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::SearchBarInfo;

/// Horizontal margin for the search box (spaces on left and right).
const SEARCH_BOX_MARGIN: usize = 5;

/// Renders the 3-line search box into `area`.
///
/// ```text
/// [margin] ┌──────────────────────┐ [margin]
/// [margin] │ Search events: pizza▏│ [margin]
/// [margin] └──────────────────────┘ [margin]
/// ```
///
/// Returns the row below the box.
pub fn render_search_bar(area: Rect, search: &SearchBarInfo, theme: &Theme) -> usize {
    let margin = if area.width > SEARCH_BOX_MARGIN * 2 + 20 { SEARCH_BOX_MARGIN } else { 0 };
    let box_width = area.width.saturating_sub(margin * 2);
    let inner_width = box_width.saturating_sub(2);
    let border = Theme::fg(&theme.colors.search_bar_border);

    position_cursor(area.row, area.col + margin);
    print!("{border}┌{}┐{}", "─".repeat(inner_width), Theme::reset());

    let search_text = fit_padded(&format!(" Search events: {}▏", search.draft), inner_width);

    position_cursor(area.row + 1, area.col + margin);
    print!("{border}│");
    print!("{}{search_text}", Theme::fg(&theme.colors.text_normal));
    print!("{border}│{}", Theme::reset());

    position_cursor(area.row + 2, area.col + margin);
    print!("{border}└{}┘{}", "─".repeat(inner_width), Theme::reset());

    area.row + area.height
}
