//! Screen geometry shared by the renderer and mouse hit testing.
//!
//! ```text
//! row 1      header: title and status
//! row 2      header: filter summary
//! row 3      ─────────────────────────────
//! (3 rows)   search box, only while searching
//! body       list pane │ map pane
//! rows-1     ─────────────────────────────
//! rows       footer
//! ```
//!
//! All positions are 1-indexed terminal cells, matching
//! [`position_cursor`](crate::ui::helpers::position_cursor).

/// Rows used by the two header lines.
pub const HEADER_ROWS: usize = 2;

/// Rows used by the search box.
pub const SEARCH_ROWS: usize = 3;

/// Below this width the map pane is dropped and the list takes the screen.
pub const MIN_SPLIT_COLS: usize = 60;

/// Rows used by one list entry.
pub const LIST_ITEM_ROWS: usize = 2;

/// Rows reserved for the fetch error panel at the top of the list pane.
pub const ERROR_PANEL_ROWS: usize = 2;

/// Tallest the detail popup gets.
pub const POPUP_MAX_ROWS: usize = 9;

/// Width of the popup close control `[x]`.
pub const CLOSE_CONTROL_WIDTH: usize = 3;

/// A rectangle of terminal cells. `row`/`col` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub row: usize,
    pub col: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    #[must_use]
    pub const fn new(row: usize, col: usize, width: usize, height: usize) -> Self {
        Self { row, col, width, height }
    }

    #[must_use]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row
            && row < self.row + self.height
            && col >= self.col
            && col < self.col + self.width
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Last column inside the rectangle.
    #[must_use]
    pub const fn right(&self) -> usize {
        (self.col + self.width).saturating_sub(1)
    }

    /// Last row inside the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> usize {
        (self.row + self.height).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenLayout {
    pub rows: usize,
    pub cols: usize,
    pub header: Rect,
    pub search: Option<Rect>,
    pub list: Rect,
    /// `None` when the pane is too narrow for a side-by-side split.
    pub map: Option<Rect>,
    /// Present while an event is selected; drawn over the bottom of the map
    /// pane (or the list pane when there is no map).
    pub popup: Option<Rect>,
    pub footer_row: usize,
}

impl ScreenLayout {
    #[must_use]
    pub fn compute(rows: usize, cols: usize, search_open: bool, popup_open: bool) -> Self {
        let header = Rect::new(1, 1, cols, HEADER_ROWS);
        let mut next_row = HEADER_ROWS + 2;

        let search = search_open.then(|| {
            let rect = Rect::new(next_row, 1, cols, SEARCH_ROWS);
            next_row += SEARCH_ROWS;
            rect
        });

        let body_height = rows.saturating_sub(1).saturating_sub(next_row);

        let (list, map) = if cols >= MIN_SPLIT_COLS {
            let list_width = (cols * 2 / 5).max(28);
            let map_col = list_width + 2;
            (
                Rect::new(next_row, 1, list_width, body_height),
                Some(Rect::new(next_row, map_col, cols.saturating_sub(map_col - 1), body_height)),
            )
        } else {
            (Rect::new(next_row, 1, cols, body_height), None)
        };

        let popup = popup_open.then(|| {
            let host = map.unwrap_or(list);
            let height = host.height.min(POPUP_MAX_ROWS);
            Rect::new(host.row + host.height - height, host.col, host.width, height)
        });

        Self {
            rows,
            cols,
            header,
            search,
            list,
            map,
            popup: popup.filter(|rect| !rect.is_empty()),
            footer_row: rows,
        }
    }

    /// Cells of the popup close control, `[x]` in the popup's top-right corner.
    #[must_use]
    pub fn close_control(&self) -> Option<Rect> {
        self.popup
            .filter(|popup| popup.width > CLOSE_CONTROL_WIDTH + 1)
            .map(|popup| {
                Rect::new(
                    popup.row,
                    popup.right() - CLOSE_CONTROL_WIDTH,
                    CLOSE_CONTROL_WIDTH,
                    1,
                )
            })
    }
}
