//! Outgoing calls to the events service and the geolocation provider.

use super::context::{RequestContext, RequestTag};
use crate::domain::{Result, ZeroCostError};
use crate::engine::FetchTicket;
use std::collections::BTreeMap;
use url::Url;

/// Default base URL of the events service.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default IP geolocation endpoint used by the `auto` location capability.
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One web request for the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub context: RequestContext,
}

impl ApiCall {
    fn get(url: Url, tag: RequestTag) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: json_headers(),
            body: Vec::new(),
            context: RequestContext::capture(tag),
        }
    }
}

fn json_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

/// Builds calls against `{api_url}/api/v1`.
///
/// The base URL is validated when a call is built, so a misconfigured
/// `api_url` surfaces as an ordinary request failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl Endpoint {
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        Self {
            base: api_url.trim().to_string(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// # Errors
    ///
    /// Returns [`ZeroCostError::Url`] for an unparseable base and
    /// [`ZeroCostError::Config`] for one that cannot carry a path
    /// (`mailto:` and the like).
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base)?;
        url.path_segments_mut()
            .map_err(|()| ZeroCostError::Config(format!("api_url '{}' cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// `POST /events/nearby` for a ticket issued by the fetch controller.
    ///
    /// # Errors
    ///
    /// Fails only if the query cannot be serialized or the URL cannot be built.
    pub fn nearby(&self, ticket: &FetchTicket) -> Result<ApiCall> {
        Ok(ApiCall {
            method: HttpMethod::Post,
            url: self.url(&["events", "nearby"])?.into(),
            headers: json_headers(),
            body: serde_json::to_vec(&ticket.query)?,
            context: RequestContext::capture(RequestTag::Nearby {
                generation: ticket.generation,
            }),
        })
    }

    /// `GET /events/search?query=`.
    ///
    /// The event handler never issues this call: nearby requests already carry
    /// the query. It is kept for callers that want text search without a
    /// position. Replies decode like nearby replies, so `generation` must come
    /// from the same [`FetchController`](crate::engine::FetchController) that
    /// completes them, otherwise they are dropped as stale.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built.
    pub fn search(&self, generation: u64, query: &str) -> Result<ApiCall> {
        let mut url = self.url(&["events", "search"])?;
        url.query_pairs_mut().append_pair("query", query.trim());
        Ok(ApiCall::get(url, RequestTag::Search { generation }))
    }

    /// `GET /events/{id}`; the id is percent-encoded as a single segment.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built.
    pub fn event_by_id(&self, id: &str) -> Result<ApiCall> {
        let url = self.url(&["events", id])?;
        Ok(ApiCall::get(url, RequestTag::Detail { id: id.to_string() }))
    }

    /// `GET /categories`.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built.
    pub fn categories(&self) -> Result<ApiCall> {
        let url = self.url(&["categories"])?;
        Ok(ApiCall::get(url, RequestTag::Categories))
    }
}

/// Position lookup against an IP geolocation provider.
///
/// # Errors
///
/// Returns [`ZeroCostError::Url`] if `provider` is not a valid URL.
pub fn geolocate(provider: &str, attempt: u64) -> Result<ApiCall> {
    let url = Url::parse(provider.trim())?;
    Ok(ApiCall::get(url, RequestTag::Geolocate { attempt }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FilterState, DEFAULT_FALLBACK};
    use crate::engine::FetchController;

    #[test]
    fn nearby_posts_query_body() {
        let endpoint = Endpoint::default();
        let ticket = FetchController::default()
            .request(DEFAULT_FALLBACK, &FilterState::default())
            .unwrap();
        let call = endpoint.nearby(&ticket).unwrap();

        assert_eq!(call.method, HttpMethod::Post);
        assert_eq!(call.url, "http://localhost:8080/api/v1/events/nearby");
        let body: serde_json::Value = serde_json::from_slice(&call.body).unwrap();
        assert_eq!(body["latitude"], 37.7749);
        assert_eq!(body["limit"], 100);
        assert!(body.get("query").is_none());
        assert_eq!(call.context.tag, RequestTag::Nearby { generation: 1 });
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let endpoint = Endpoint::new("https://events.example.org/free/");
        let call = endpoint.categories().unwrap();
        assert_eq!(call.url, "https://events.example.org/free/api/v1/categories");
    }

    #[test]
    fn search_and_lookup_encode_user_input() {
        let endpoint = Endpoint::default();

        let search = endpoint.search(3, " free pizza & soda ").unwrap();
        assert_eq!(
            search.url,
            "http://localhost:8080/api/v1/events/search?query=free+pizza+%26+soda"
        );

        let lookup = endpoint.event_by_id("a/b").unwrap();
        assert_eq!(lookup.url, "http://localhost:8080/api/v1/events/a%2Fb");
        assert_eq!(lookup.method, HttpMethod::Get);
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            Endpoint::new("not a url").categories(),
            Err(ZeroCostError::Url(_))
        ));
        assert!(matches!(
            Endpoint::new("mailto:a@b.c").event_by_id("x"),
            Err(ZeroCostError::Config(_))
        ));
    }
}
