//! ZeroCost: a Zellij plugin for discovering free events nearby.
//!
//! The plugin resolves the user's position once (falling back to a fixed
//! coordinate), queries a remote events service for free events within a
//! radius, and shows the results as a list and a terminal map that share one
//! selection.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling, actions                          │
//! │  - View model computation, hit testing              │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌────────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Engine         │   │ Remote        │
//! │ (ui/)         │   │ (engine/)      │   │ (remote/)     │
//! │ - Layout      │   │ - Location     │   │ - Requests    │
//! │ - List, map   │   │ - Filters      │   │ - Replies     │
//! │ - Theming     │   │ - Fetch        │   │ - Trace ctx   │
//! │               │   │ - Selection    │   │               │
//! └───────────────┘   └────────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/): coordinates, events, filters,    │
//! │  errors. Infrastructure (infrastructure/): paths    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry spans to rotating OTLP JSON file   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/zerocost.wasm" {
//!         api_url "https://events.example.org"
//!         location "auto"            // auto | fixed | off
//!         max_distance_km "25"
//!         theme "catppuccin-latte"
//!         trace_level "zerocost=debug"
//!     }
//! }
//! ```
//!
//! # Data Flow
//!
//! 1. Permissions granted: fetch category metadata, start locating.
//! 2. Location settles (live or fallback): one nearby request for
//!    (position, filters).
//! 3. Every filter change: a new request; only the newest reply is applied.
//! 4. Every reply: selection reconciled against the new set before the frame
//!    renders, so list, map and popup never show a vanished event.
//!
//! # Example
//!
//! ```rust
//! use zerocost::{handle_event, initialize, Config, Event, LocationSource};
//! use zerocost::domain::DEFAULT_FALLBACK;
//!
//! let config = Config {
//!     location: LocationSource::Fixed(DEFAULT_FALLBACK),
//!     ..Config::default()
//! };
//! let mut state = initialize(&config);
//!
//! let (_render, actions) = handle_event(&mut state, &Event::Start)?;
//! // categories + nearby
//! assert_eq!(actions.len(), 2);
//! # Ok::<(), zerocost::ZeroCostError>(())
//! ```

pub mod app;
pub mod domain;
pub mod engine;
pub mod infrastructure;
pub mod remote;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, Focus, InputMode};
pub use domain::{Coordinate, Result, ZeroCostError};
pub use ui::Theme;

use domain::{DEFAULT_FALLBACK, DEFAULT_MAX_DISTANCE_KM};
use engine::{DEFAULT_LIMIT, DEFAULT_LOCATION_TIMEOUT};
use remote::{DEFAULT_API_URL, DEFAULT_GEOLOCATION_URL};
use std::collections::BTreeMap;
use std::time::Duration;

/// Where the "current location" comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationSource {
    /// Ask an IP geolocation provider, with a timeout.
    #[default]
    Auto,
    /// A configured position, answered without any request.
    Fixed(Coordinate),
    /// No capability; the fallback is used immediately.
    Off,
}

/// Plugin configuration parsed from Zellij's configuration system.
///
/// Built once at load; nothing changes it afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the events service; `/api/v1` is appended.
    pub api_url: String,

    pub location: LocationSource,

    /// Provider queried by [`LocationSource::Auto`].
    pub geolocation_url: String,

    /// How long a location attempt may take before the fallback is used.
    pub location_timeout: Duration,

    /// Position used whenever live location is unavailable.
    pub fallback: Coordinate,

    /// Initial search radius.
    pub max_distance_km: f64,

    /// Maximum number of events requested.
    pub limit: u32,

    /// Built-in theme name: `catppuccin-mocha` or `catppuccin-latte`.
    /// Ignored if `theme_file` is set.
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file. See [`ui::theme`] for the format.
    pub theme_file: Option<String>,

    /// `EnvFilter` directive for tracing. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            location: LocationSource::Auto,
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            fallback: DEFAULT_FALLBACK,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            limit: DEFAULT_LIMIT,
            theme_name: None,
            theme_file: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from Zellij's configuration map.
    ///
    /// Every key is optional and every unparseable value falls back to its
    /// default, so a typo never prevents the plugin from loading.
    ///
    /// # Parsing Rules
    ///
    /// - `location`: `auto` | `fixed` | `off`; `fixed` needs valid
    ///   `latitude`/`longitude` and degrades to `off` without them
    /// - `location_timeout_secs`, `limit`: positive integers
    /// - `max_distance_km`: positive number
    /// - `fallback_latitude`/`fallback_longitude`: both valid, or the default
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use zerocost::{Config, LocationSource};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("location".to_string(), "fixed".to_string());
    /// map.insert("latitude".to_string(), "51.5072".to_string());
    /// map.insert("longitude".to_string(), "-0.1276".to_string());
    /// map.insert("max_distance_km".to_string(), "10".to_string());
    ///
    /// let config = Config::from_zellij(&map);
    /// assert!(matches!(config.location, LocationSource::Fixed(_)));
    /// assert_eq!(config.max_distance_km, 10.0);
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let location = match text("location").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("fixed") => coordinate(config, "latitude", "longitude")
                .map_or(LocationSource::Off, LocationSource::Fixed),
            Some("off") => LocationSource::Off,
            _ => LocationSource::Auto,
        };

        let location_timeout = config
            .get("location_timeout_secs")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.location_timeout, Duration::from_secs);

        let max_distance_km = config
            .get("max_distance_km")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|km| km.is_finite() && *km > 0.0)
            .unwrap_or(defaults.max_distance_km);

        let limit = config
            .get("limit")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.limit);

        Self {
            api_url: text("api_url").unwrap_or(defaults.api_url),
            location,
            geolocation_url: text("geolocation_url").unwrap_or(defaults.geolocation_url),
            location_timeout,
            fallback: coordinate(config, "fallback_latitude", "fallback_longitude").unwrap_or(defaults.fallback),
            max_distance_km,
            limit,
            theme_name: text("theme"),
            theme_file: text("theme_file"),
            trace_level: text("trace_level"),
        }
    }
}

fn coordinate(config: &BTreeMap<String, String>, lat_key: &str, lon_key: &str) -> Option<Coordinate> {
    let latitude = config.get(lat_key)?.trim().parse::<f64>().ok()?;
    let longitude = config.get(lon_key)?.trim().parse::<f64>().ok()?;
    Coordinate::new(latitude, longitude).ok()
}

/// Creates the application state for `config`.
///
/// The theme comes from `theme_file`, then `theme`, then the default; a
/// theme that fails to load is logged and replaced by the default.
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(
        api_url = %config.api_url,
        location = ?config.location,
        radius_km = config.max_distance_km,
        "initializing zerocost plugin"
    );

    let theme = config.theme_file.as_ref().map_or_else(
        || {
            config.theme_name.as_ref().map_or_else(Theme::default, |theme_name| {
                Theme::from_name(theme_name).unwrap_or_else(|| {
                    tracing::warn!(theme_name = %theme_name, "unknown theme, using default");
                    Theme::default()
                })
            })
        },
        |theme_file| {
            Theme::from_file(infrastructure::expand_tilde(theme_file)).unwrap_or_else(|e| {
                tracing::warn!(theme_file = %theme_file, error = %e, "failed to load theme from file, using default");
                Theme::default()
            })
        },
    );

    AppState::new(config.clone(), theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_zellij(&BTreeMap::new());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.location, LocationSource::Auto);
        assert_eq!(config.fallback, DEFAULT_FALLBACK);
        assert_eq!(config.max_distance_km, 50.0);
        assert_eq!(config.limit, 100);
        assert_eq!(config.location_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_zellij(&map(&[
            ("location", "fixed"),
            ("latitude", "123"),
            ("longitude", "0"),
            ("max_distance_km", "-3"),
            ("limit", "zero"),
            ("location_timeout_secs", "0"),
            ("fallback_latitude", "48.85"),
        ]));
        assert_eq!(config.location, LocationSource::Off);
        assert_eq!(config.max_distance_km, 50.0);
        assert_eq!(config.limit, 100);
        assert_eq!(config.location_timeout, Duration::from_secs(5));
        assert_eq!(config.fallback, DEFAULT_FALLBACK);
    }

    #[test]
    fn custom_fallback_and_provider() {
        let config = Config::from_zellij(&map(&[
            ("location", "OFF"),
            ("fallback_latitude", "48.8566"),
            ("fallback_longitude", "2.3522"),
            ("geolocation_url", "https://geo.example.org/json"),
            ("api_url", " https://events.example.org "),
        ]));
        assert_eq!(config.location, LocationSource::Off);
        assert_eq!(config.fallback, Coordinate::new(48.8566, 2.3522).unwrap());
        assert_eq!(config.geolocation_url, "https://geo.example.org/json");
        assert_eq!(config.api_url, "https://events.example.org");
    }

    #[test]
    fn initialize_starts_with_configured_radius() {
        let config = Config { max_distance_km: 12.5, ..Config::default() };
        let state = initialize(&config);
        assert_eq!(state.filters.current().max_distance_km, 12.5);
        assert_eq!(state.theme.name, "catppuccin-mocha");
    }
}
