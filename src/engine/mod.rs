//! Discovery engine state machines.
//!
//! Each component here is synchronous and platform-agnostic: it takes inputs,
//! updates its own state and returns what the caller should do next. The
//! application layer wires them together and performs the actual I/O.
//!
//! - [`location`]: one-shot position resolution with fallback
//! - [`filters`]: the query parameter store
//! - [`fetch`]: nearby-events lifecycle with last-request-wins
//! - [`selection`]: id-based selection shared by list and map

pub mod fetch;
pub mod filters;
pub mod location;
pub mod selection;

pub use fetch::{
    Completion, EventSet, FetchController, FetchError, FetchStatus, FetchTicket, NearbyQuery,
    DEFAULT_LIMIT, FETCH_FAILED_MESSAGE,
};
pub use filters::{FilterChange, QueryStore};
pub use location::{
    LocationFailure, LocationResolver, LocationStatus, PositionRequest, Resolution,
    DEFAULT_LOCATION_TIMEOUT,
};
pub use selection::SelectionCoordinator;
