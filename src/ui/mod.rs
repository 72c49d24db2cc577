//! User interface rendering layer with component-based architecture.
//!
//! ```text
//! AppState → compute_viewmodel → UIViewModel → render → ANSI Output
//!                                     ↓
//!                                 hit_test (mouse)
//! ```
//!
//! # Modules
//!
//! - [`layout`]: Screen geometry shared by rendering and hit testing
//! - [`map`]: Coordinate to terminal cell projection
//! - [`viewmodel`]: View model types representing renderable UI state
//! - [`renderer`]: Top-level rendering coordinator
//! - [`components`]: Composable UI component renderers
//! - [`helpers`]: Shared rendering utilities (highlighting, clipping)
//! - [`theme`]: Color scheme definitions and ANSI escape sequence generation

pub mod components;
pub mod helpers;
pub mod layout;
pub mod map;
pub mod renderer;
pub mod theme;
pub mod viewmodel;

pub use renderer::render;
pub use theme::Theme;
pub use viewmodel::{
    EmptyState, FooterInfo, HeaderInfo, ListItem, ListViewModel, MapViewModel, MarkerDescriptor,
    PopupInfo, SearchBarInfo, UIViewModel,
};
