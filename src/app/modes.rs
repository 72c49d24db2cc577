//! Input and focus state types for the application.
//!
//! These enums decide how a key press is interpreted and which pane shows the
//! focus frame. Neither affects what is fetched or selected.

/// Current input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and command keys are active.
    #[default]
    Normal,

    /// Keys edit the search draft. Enter commits it as the free-text filter,
    /// Esc discards it.
    Search,
}

/// Which of the two synchronized views receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// `j`/`k` move the list cursor, Enter selects the row under it.
    #[default]
    List,

    /// `n`/`p` step the selection through the markers on the map.
    Map,
}

impl Focus {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::List => Self::Map,
            Self::Map => Self::List,
        }
    }
}
