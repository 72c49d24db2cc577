//! Error types for the ZeroCost plugin.
//!
//! This module defines the centralized error type [`ZeroCostError`] and a type alias
//! [`Result`] used throughout the crate. The first three variants form the recovery
//! taxonomy of the discovery engine: none of them is fatal, and each one has a
//! documented fallback behavior at the call site that observes it.

use thiserror::Error;

/// The main error type for ZeroCost operations.
///
/// # Examples
///
/// ```
/// use zerocost::domain::ZeroCostError;
///
/// let err = ZeroCostError::SelectionInvalid { id: "evt-7".to_string() };
/// assert_eq!(err.to_string(), "Selected event evt-7 is not in the current result set");
/// ```
#[derive(Debug, Error)]
pub enum ZeroCostError {
    /// Live geolocation could not be obtained.
    ///
    /// Permission denied, capability missing, or timeout. Recovered by switching to
    /// the configured fallback coordinate.
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// The nearby-events request failed.
    ///
    /// Network error, non-2xx response or malformed payload. Recovered by surfacing
    /// a retryable error state; never retried automatically.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// A selection referenced an id absent from the current event set.
    ///
    /// Recovered silently: the prior selection is kept, or reset to none when the
    /// event set is replaced.
    #[error("Selected event {id} is not in the current result set")]
    SelectionInvalid {
        /// The rejected event id.
        id: String,
    },

    /// Latitude or longitude outside the valid range.
    #[error("Invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },

    /// A filter update carried an invalid value.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A payload from the remote collaborator could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Theme parsing or application failed.
    #[error("Theme error: {0}")]
    Theme(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for ZeroCost operations.
pub type Result<T> = std::result::Result<T, ZeroCostError>;
