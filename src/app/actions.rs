//! Actions representing side effects to be executed by the plugin runtime.
//!
//! The event handler returns a `Vec<Action>` after processing each event, so
//! several side effects can be queued atomically. The plugin shim executes them
//! in order after the state mutation is complete.

use crate::remote::ApiCall;
use std::time::Duration;

/// Commands representing side effects to be executed by the plugin runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Closes the focused floating pane, hiding the plugin UI.
    ///
    /// Sent when the user explicitly requests to exit the plugin (e.g., pressing 'q').
    CloseFocus,

    /// Performs a web request. The reply arrives later as a
    /// [`Event::WebResponse`](crate::app::Event::WebResponse).
    Http(ApiCall),

    /// Arms a one-shot host timer. Expiry arrives as
    /// [`Event::Timer`](crate::app::Event::Timer).
    StartTimer(Duration),
}
