//! Header component renderer.
//!
//! Two lines: the title with the location/load status on the right, then
//! the filter summary with the active filter badge.

use crate::ui::helpers::{display_width, fit, position_cursor};
use crate::ui::layout::Rect;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{HeaderInfo, StatusTone};

/// Renders both header lines into `area`.
///
/// Returns the row below the header.
pub fn render_header(area: Rect, header: &HeaderInfo, theme: &Theme) -> usize {
    let cols = area.width;

    position_cursor(area.row, area.col);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    if let Some(bg) = &theme.colors.header_bg {
        print!("{}", Theme::bg(bg));
    }
    let title = fit(&header.title, cols);
    let title_len = display_width(&title);
    print!("{title}");
    print!("{}", Theme::reset());

    let status = fit(&header.status, cols.saturating_sub(title_len + 1));
    let status_len = display_width(&status);
    let status_color = match header.tone {
        StatusTone::Normal => &theme.colors.text_normal,
        StatusTone::Busy => &theme.colors.text_dim,
        StatusTone::Warning => &theme.colors.warning_fg,
        StatusTone::Error => &theme.colors.error_fg,
    };
    print!("{}", " ".repeat(cols.saturating_sub(title_len + status_len)));
    print!("{}{status}{}", Theme::fg(status_color), Theme::reset());

    let badge = match header.active_filters {
        0 => String::new(),
        1 => " 1 filter active ".to_string(),
        n => format!(" {n} filters active "),
    };
    let badge_len = display_width(&badge);
    let summary = fit(&format!(" {}", header.filters), cols.saturating_sub(badge_len));
    let summary_len = display_width(&summary);

    position_cursor(area.row + 1, area.col);
    print!("{}{summary}{}", Theme::fg(&theme.colors.text_dim), Theme::reset());
    print!("{}", " ".repeat(cols.saturating_sub(summary_len + badge_len)));
    if badge_len > 0 {
        print!("{}{}{badge}{}", Theme::bold(), Theme::fg(&theme.colors.badge_fg), Theme::reset());
    }

    area.row + area.height
}
