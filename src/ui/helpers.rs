//! Shared rendering utilities and helpers.
//!
//! Everything here works on character indices, not bytes, so titles with
//! accents or emoji neither panic nor overflow their column.

use crate::ui::theme::Theme;

/// Positions the cursor at a 1-indexed row and column.
pub fn position_cursor(row: usize, col: usize) {
    print!("\u{1b}[{row};{col}H");
}

/// Number of terminal columns `text` occupies, counting one per character.
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Cuts `text` to `width` columns, ending with `…` when something was cut.
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// [`fit`], then right-padded with spaces to exactly `width` columns.
#[must_use]
pub fn fit_padded(text: &str, width: usize) -> String {
    let fitted = fit(text, width);
    let pad = width.saturating_sub(display_width(&fitted));
    format!("{fitted}{}", " ".repeat(pad))
}

/// Prints `text` clipped to `width` columns, highlighting the character
/// ranges `(start, end)` with the match colors.
///
/// With `is_selected` the highlight is skipped so it does not fight the
/// selection background. The caller's colors are restored after each range.
pub fn render_highlighted_text(
    text: &str,
    ranges: &[(usize, usize)],
    theme: &Theme,
    is_selected: bool,
    width: usize,
    restore: &str,
) {
    let chars: Vec<char> = fit(text, width).chars().collect();

    if ranges.is_empty() || is_selected {
        print!("{}", chars.iter().collect::<String>());
        return;
    }

    let mut current_pos = 0;
    for &(start, end) in ranges {
        let start = start.min(chars.len());
        let end = end.min(chars.len());
        if start < current_pos || start >= end {
            continue;
        }

        let normal_section: String = chars[current_pos..start].iter().collect();
        print!("{normal_section}");

        print!("{}", Theme::fg(&theme.colors.match_highlight_fg));
        print!("{}", Theme::bg(&theme.colors.match_highlight_bg));
        let highlighted_section: String = chars[start..end].iter().collect();
        print!("{highlighted_section}");
        print!("{}{restore}", Theme::reset());

        current_pos = end;
    }

    if current_pos < chars.len() {
        let remaining: String = chars[current_pos..].iter().collect();
        print!("{remaining}");
    }
}
