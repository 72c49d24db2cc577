//! Remote collaborator plumbing.
//!
//! The plugin never blocks on I/O: requests are described as [`ApiCall`]
//! values, the host performs them, and the replies come back as
//! `WebRequestResult` events that [`decode_response`] turns into application
//! events. Correlation and trace context ride along in [`RequestContext`].

pub mod context;
pub mod request;
pub mod response;

pub use context::{RequestContext, RequestTag, TraceContext};
pub use request::{geolocate, ApiCall, Endpoint, HttpMethod, DEFAULT_API_URL, DEFAULT_GEOLOCATION_URL};
pub use response::decode_response;
