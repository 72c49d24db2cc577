//! Zellij plugin wrapper and entry point.
//!
//! This is the thin integration layer between the ZeroCost library and the
//! Zellij plugin system: it translates host events into library events, runs
//! `handle_event`, and performs the returned actions with host calls.
//!
//! # Plugin Lifecycle
//!
//! 1. **Load**: Parse config, initialize tracing, create `AppState`
//! 2. **Subscribe**: Key, Mouse, Timer, `WebRequestResult`, `PermissionRequestResult`
//! 3. **Permissions**: granted starts discovery; denied falls back to the
//!    default area
//! 4. **Update**: Translate events, delegate to the library, run actions
//! 5. **Render**: Call library render function
//!
//! # Event Mapping
//!
//! - `Key` → navigation, filter and search events (see below)
//! - `Mouse(LeftClick)` → `Event::Click` (0-indexed host cell → 1-indexed)
//! - `Timer` → `Event::Timer`
//! - `WebRequestResult` → `Event::WebResponse`
//!
//! # Keybindings
//!
//! Global (all modes):
//! - `Ctrl+n` / `Ctrl+p`: Next / previous
//!
//! In normal mode:
//! - `j`/`Down`, `k`/`Up`: Move in the list (or step markers with map focus)
//! - `n`/`p`: Same as `j`/`k`
//! - `Enter`: Select the event under the cursor
//! - `Esc`: Close the detail popup
//! - `Tab`: Switch focus between list and map
//! - `/`: Search
//! - `1`-`8`: Toggle category
//! - `+`/`-`: Widen / narrow the radius
//! - `C`: Clear filters
//! - `r`: Retry the last request
//! - `L`: Locate again
//! - `d`: Load details for the selected event
//! - `q`: Close plugin
//!
//! In search mode:
//! - Any character: Type
//! - `Enter`: Apply
//! - `Esc`: Cancel

#![allow(clippy::multiple_crate_versions)]

#[cfg(target_arch = "wasm32")]
use shim::State;
#[cfg(target_arch = "wasm32")]
use zellij_tile::prelude::*;

#[cfg(target_arch = "wasm32")]
register_plugin!(State);

#[cfg(not(target_arch = "wasm32"))]
fn main() {}

#[cfg(target_arch = "wasm32")]
mod shim {
    use std::collections::BTreeMap;
    use zellij_tile::prelude::*;
    use zerocost::remote::{ApiCall, HttpMethod};
    use zerocost::{handle_event, Action, Config, Event, InputMode};

    /// Plugin state wrapper.
    ///
    /// Wraps the library's `AppState` with the last known pane size, which
    /// mouse hit testing needs to rebuild the rendered layout.
    pub struct State {
        app: zerocost::AppState,
        rows: usize,
        cols: usize,
    }

    impl Default for State {
        fn default() -> Self {
            Self {
                app: zerocost::initialize(&Config::default()),
                rows: 0,
                cols: 0,
            }
        }
    }

    impl ZellijPlugin for State {
        /// Parses configuration, requests permissions and subscribes to events.
        ///
        /// Discovery starts once the permission request is answered.
        fn load(&mut self, configuration: BTreeMap<String, String>) {
            let config = Config::from_zellij(&configuration);
            zerocost::observability::init_tracing(&config);

            let span = tracing::debug_span!("plugin_load");
            let _guard = span.entered();

            tracing::debug!(api_url = %config.api_url, location = ?config.location, "parsed configuration");
            self.app = zerocost::initialize(&config);

            request_permission(&[PermissionType::WebAccess, PermissionType::ChangeApplicationState]);

            subscribe(&[
                EventType::Key,
                EventType::Mouse,
                EventType::Timer,
                EventType::WebRequestResult,
                EventType::PermissionRequestResult,
            ]);

            tracing::debug!("plugin load complete - waiting for permissions");
        }

        /// Returns `true` if the UI should re-render.
        fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
            let event_name = Self::get_event_name(&event);
            let span = tracing::debug_span!("plugin_update_event", event_type = %event_name);
            let _guard = span.entered();

            let our_event = match event {
                zellij_tile::prelude::Event::Key(ref key) => match self.map_key_event(key) {
                    Some(event) => event,
                    None => return false,
                },
                zellij_tile::prelude::Event::Mouse(mouse) => match self.map_mouse_event(mouse) {
                    Some(event) => event,
                    None => return false,
                },
                zellij_tile::prelude::Event::Timer(_elapsed) => Event::Timer,
                zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                    Event::WebResponse { status, body, context }
                }
                zellij_tile::prelude::Event::PermissionRequestResult(permissions) => match permissions {
                    PermissionStatus::Granted => Event::Start,
                    PermissionStatus::Denied => Event::PermissionDenied,
                },
                _ => return false,
            };

            match handle_event(&mut self.app, &our_event) {
                Ok((should_render, actions)) => {
                    tracing::debug!(action_count = actions.len(), should_render, "event handled successfully");
                    for a in actions {
                        Self::execute_action(&a);
                    }
                    should_render
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error handling event");
                    false
                }
            }
        }

        fn render(&mut self, rows: usize, cols: usize) {
            self.rows = rows;
            self.cols = cols;
            zerocost::ui::render(&self.app, rows, cols);
        }
    }

    impl State {
        fn get_event_name(event: &zellij_tile::prelude::Event) -> String {
            match event {
                zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
                zellij_tile::prelude::Event::Mouse(..) => "Mouse".to_string(),
                zellij_tile::prelude::Event::Timer(..) => "Timer".to_string(),
                zellij_tile::prelude::Event::WebRequestResult(status, ..) => format!("WebRequestResult({status})"),
                zellij_tile::prelude::Event::PermissionRequestResult(..) => "PermissionRequestResult".to_string(),
                _ => "Other".to_string(),
            }
        }

        fn map_key_event(&self, key: &KeyWithModifier) -> Option<Event> {
            tracing::debug!(bare_key = ?key.bare_key, "key event");

            if key.bare_key == BareKey::Char('n') && key.has_modifiers(&[KeyModifier::Ctrl]) {
                return Some(Event::Next);
            }
            if key.bare_key == BareKey::Char('p') && key.has_modifiers(&[KeyModifier::Ctrl]) {
                return Some(Event::Prev);
            }

            if self.app.input_mode == InputMode::Search {
                return Some(match key.bare_key {
                    BareKey::Enter => Event::Activate,
                    BareKey::Esc => Event::Dismiss,
                    BareKey::Backspace => Event::Backspace,
                    BareKey::Char(c) => Event::Char(c),
                    _ => return None,
                });
            }

            Some(match key.bare_key {
                BareKey::Down | BareKey::Char('j' | 'n') => Event::Next,
                BareKey::Up | BareKey::Char('k' | 'p') => Event::Prev,
                BareKey::Enter => Event::Activate,
                BareKey::Esc => Event::Dismiss,
                BareKey::Tab => Event::ToggleFocus,
                BareKey::Char('/') => Event::SearchMode,
                BareKey::Char(c @ '1'..='8') => Event::ToggleCategory(c as usize - '1' as usize),
                BareKey::Char('+' | '=') => Event::WidenRadius,
                BareKey::Char('-') => Event::NarrowRadius,
                BareKey::Char('C') => Event::ClearFilters,
                BareKey::Char('r') => Event::Retry,
                BareKey::Char('L') => Event::RefreshLocation,
                BareKey::Char('d') => Event::RequestDetail,
                BareKey::Char('q') => Event::CloseFocus,
                _ => return None,
            })
        }

        /// Host mouse positions are 0-indexed within the pane.
        fn map_mouse_event(&self, mouse: Mouse) -> Option<Event> {
            match mouse {
                Mouse::LeftClick(line, col) => {
                    let row = usize::try_from(line).ok()? + 1;
                    Some(Event::Click {
                        row,
                        col: col + 1,
                        rows: self.rows,
                        cols: self.cols,
                    })
                }
                _ => None,
            }
        }

        #[tracing::instrument(level = "debug", skip_all)]
        fn execute_action(action: &Action) {
            match action {
                Action::CloseFocus => {
                    tracing::debug!("closing plugin focus");
                    hide_self();
                }
                Action::Http(call) => Self::send(call),
                Action::StartTimer(duration) => set_timeout(duration.as_secs_f64()),
            }
        }

        fn send(call: &ApiCall) {
            let verb = match call.method {
                HttpMethod::Get => HttpVerb::Get,
                HttpMethod::Post => HttpVerb::Post,
            };
            tracing::debug!(url = %call.url, kind = call.context.tag.kind(), "web request");
            web_request(&call.url, verb, call.headers.clone(), call.body.clone(), call.context.to_map());
        }
    }
}
