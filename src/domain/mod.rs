//! Domain layer for the ZeroCost plugin.
//!
//! Core value types shared by the engine, the remote layer and the UI, free of
//! any Zellij-specific API.
//!
//! # Organization
//!
//! - [`coordinate`]: validated latitude/longitude pair
//! - [`error`]: error taxonomy and result alias
//! - [`event`]: event records and category metadata
//! - [`filter`]: filter criteria and partial updates

pub mod coordinate;
pub mod error;
pub mod event;
pub mod filter;

pub use coordinate::{Coordinate, DEFAULT_FALLBACK};
pub use error::{Result, ZeroCostError};
pub use event::{decode_events, Category, CategoryCatalog, CategoryInfo, EventRecord};
pub use filter::{FilterPatch, FilterState, DEFAULT_MAX_DISTANCE_KM};
