//! Detail popup for the selected event.
//!
//! ```text
//! ┌ Pizza on the quad ✓ ────────────[x]┐
//! │ Free Food · Today • 6:00 PM        │
//! │ 1 Campus Way · 1.2 km away         │
//! │ Leftover pizza from the hackath... │
//! │ by Student Union                   │
//! │ https://example.org/pizza          │
//! └────────────────────────────────────┘
//! ```

use crate::ui::helpers::{display_width, fit, fit_padded, position_cursor};
use crate::ui::layout::{Rect, CLOSE_CONTROL_WIDTH};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::PopupInfo;

/// Renders the popup frame and content into `area`.
pub fn render_popup(area: Rect, popup: &PopupInfo, theme: &Theme) {
    if area.width < 4 || area.height < 2 {
        return;
    }
    let inner = area.width - 2;
    let border = Theme::fg(&theme.colors.popup_border);

    let verified = if popup.verified { " ✓" } else { "" };
    let title = fit(
        &format!(" {}{verified} ", popup.title),
        inner.saturating_sub(CLOSE_CONTROL_WIDTH + 1),
    );
    let title_len = display_width(&title);

    position_cursor(area.row, area.col);
    print!("{border}┌{}{title}{}{border}", Theme::bold(), Theme::reset());
    print!("{}", "─".repeat(inner.saturating_sub(title_len + CLOSE_CONTROL_WIDTH)));
    print!("{}[x]{border}┐{}", Theme::fg(&theme.colors.error_fg), Theme::reset());

    let mut lines = vec![format!("{} · {}", popup.category, popup.when)];
    match (&popup.distance, popup.address.is_empty()) {
        (Some(distance), false) => lines.push(format!("{} · {distance}", popup.address)),
        (Some(distance), true) => lines.push(distance.clone()),
        (None, false) => lines.push(popup.address.clone()),
        (None, true) => {}
    }
    if !popup.description.is_empty() {
        lines.push(popup.description.clone());
    }
    lines.extend(popup.extra.iter().cloned());
    if let Some(url) = &popup.source_url {
        lines.push(url.clone());
    }

    let body_rows = area.height.saturating_sub(2);
    for offset in 0..body_rows {
        let text = lines.get(offset).map_or("", String::as_str);
        position_cursor(area.row + 1 + offset, area.col);
        print!("{border}│{}", Theme::fg(&theme.colors.text_normal));
        print!("{}", fit_padded(&format!(" {text}"), inner));
        print!("{border}│{}", Theme::reset());
    }

    position_cursor(area.bottom(), area.col);
    print!("{border}└{}┘{}", "─".repeat(inner), Theme::reset());
}
