//! Terminal map renderer.
//!
//! Draws the radius ring, the user's position and one category glyph per
//! event onto a character grid, then prints the grid row by row.

use crate::ui::helpers::{fit_padded, position_cursor};
use crate::ui::layout::Rect;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::MapViewModel;

const RING: char = '·';
const USER: char = '◉';

#[derive(Clone, Copy)]
struct Cell<'a> {
    glyph: char,
    color: Option<&'a str>,
    bold: bool,
}

impl Cell<'_> {
    const BLANK: Self = Self { glyph: ' ', color: None, bold: false };
}

/// Renders the map pane (title line plus canvas) into `area`.
pub fn render_map(area: Rect, map: &MapViewModel, theme: &Theme) {
    let title_color = if map.focused { &theme.colors.header_fg } else { &theme.colors.border };
    position_cursor(area.row, area.col);
    if map.focused {
        print!("{}", Theme::bold());
    }
    print!("{}{}{}", Theme::fg(title_color), fit_padded(&format!(" {}", map.title), area.width), Theme::reset());

    let canvas = map.canvas;
    let mut grid = vec![vec![Cell::BLANK; canvas.width]; canvas.height];
    let mut put = |(x, y): (usize, usize), cell| {
        if let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    };

    for &cell in &map.ring {
        put(cell, Cell { glyph: RING, color: Some(&theme.colors.radius_ring_fg), bold: false });
    }
    if let Some(cell) = map.user {
        put(cell, Cell { glyph: USER, color: Some(&theme.colors.user_marker_fg), bold: true });
    }
    // Markers are ordered with the selected one last, so it wins shared cells.
    for marker in &map.markers {
        let Some(cell) = marker.cell else { continue };
        let color = if marker.selected { &theme.colors.marker_selected_fg } else { &theme.colors.marker_fg };
        put(cell, Cell { glyph: marker.category.glyph(), color: Some(color), bold: marker.selected });
    }

    for (y, row) in grid.iter().enumerate() {
        position_cursor(canvas.row + y, canvas.col);
        for cell in row {
            match cell.color {
                Some(color) => {
                    if cell.bold {
                        print!("{}", Theme::bold());
                    }
                    print!("{}{}{}", Theme::fg(color), cell.glyph, Theme::reset());
                }
                None => print!("{}", cell.glyph),
            }
        }
    }
}
