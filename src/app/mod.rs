//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the plugin runtime (main.rs) and the engine
//! components. Data flows one way:
//!
//! ```text
//! Key / Mouse / Timer / Web reply → Event → handle_event → State Mutations → Actions
//!                                     ↑                                        ↓
//!                                     └──────────── WebResponse ◄── Http ──────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`modes`]: Input mode and pane focus
//! - [`state`]: Central application state container and view model computation

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{Focus, InputMode};
pub use state::{AppState, Hit};
