//! Turns web-request results into application events.

use super::context::{RequestContext, RequestTag};
use crate::app::Event;
use crate::domain::{decode_events, CategoryInfo, Coordinate, EventRecord, Result};
use crate::engine::{FetchError, LocationFailure};
use serde::Deserialize;

/// Reply shape of IP geolocation providers.
#[derive(Debug, Deserialize)]
struct GeoReply {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon")]
    longitude: f64,
}

const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

/// Maps a reply to the event the handler expects for its request kind.
///
/// Every outcome, failures included, becomes an event: the correlation data
/// in `context` is what lets the engine decide whether it still cares.
#[must_use]
pub fn decode_response(status: u16, body: &[u8], context: &RequestContext) -> Event {
    tracing::debug!(status, kind = context.tag.kind(), bytes = body.len(), "web request completed");

    match &context.tag {
        RequestTag::Nearby { generation } | RequestTag::Search { generation } => {
            Event::EventsLoaded {
                generation: *generation,
                outcome: decode_event_list(status, body),
            }
        }
        RequestTag::Detail { id } => Event::DetailLoaded {
            id: id.clone(),
            outcome: decode_detail(status, body),
        },
        RequestTag::Categories => Event::CategoriesLoaded(decode_categories(status, body)),
        RequestTag::Geolocate { attempt } => match decode_position(status, body) {
            Ok(coordinate) => Event::PositionFound {
                attempt: *attempt,
                coordinate,
            },
            Err(failure) => Event::PositionFailed {
                attempt: *attempt,
                failure,
            },
        },
    }
}

fn decode_event_list(status: u16, body: &[u8]) -> std::result::Result<Vec<EventRecord>, FetchError> {
    if !is_success(status) {
        return Err(FetchError::Network(format!("HTTP {status}")));
    }
    decode_events(body).map_err(|e| FetchError::Malformed(e.to_string()))
}

fn decode_detail(status: u16, body: &[u8]) -> std::result::Result<EventRecord, String> {
    if !is_success(status) {
        return Err(format!("HTTP {status}"));
    }
    let parse = || -> Result<EventRecord> {
        let record: EventRecord = serde_json::from_slice(body)?;
        record.validate()?;
        Ok(record)
    };
    parse().map_err(|e| e.to_string())
}

fn decode_categories(status: u16, body: &[u8]) -> std::result::Result<Vec<CategoryInfo>, String> {
    if !is_success(status) {
        return Err(format!("HTTP {status}"));
    }
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

fn decode_position(status: u16, body: &[u8]) -> std::result::Result<Coordinate, LocationFailure> {
    if !is_success(status) {
        tracing::warn!(status, "geolocation provider refused the request");
        return Err(LocationFailure::CapabilityMissing);
    }
    let reply: GeoReply =
        serde_json::from_slice(body).map_err(|e| LocationFailure::Malformed(e.to_string()))?;
    Coordinate::new(reply.latitude, reply.longitude)
        .map_err(|e| LocationFailure::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tag: RequestTag) -> RequestContext {
        RequestContext { tag, trace: None }
    }

    #[test]
    fn empty_list_is_success_with_no_events() {
        let event = decode_response(200, b"[]", &ctx(RequestTag::Nearby { generation: 2 }));
        assert_eq!(
            event,
            Event::EventsLoaded {
                generation: 2,
                outcome: Ok(Vec::new())
            }
        );
    }

    #[test]
    fn server_error_and_garbage_are_fetch_failures() {
        let tag = RequestTag::Nearby { generation: 1 };
        assert!(matches!(
            decode_response(503, b"", &ctx(tag.clone())),
            Event::EventsLoaded { outcome: Err(FetchError::Network(_)), .. }
        ));
        assert!(matches!(
            decode_response(200, b"{not json", &ctx(tag)),
            Event::EventsLoaded { outcome: Err(FetchError::Malformed(_)), .. }
        ));
    }

    #[test]
    fn geolocation_accepts_short_field_names() {
        let event = decode_response(
            200,
            br#"{"lat": 40.7128, "lon": -74.006, "city": "New York"}"#,
            &ctx(RequestTag::Geolocate { attempt: 1 }),
        );
        let Event::PositionFound { attempt, coordinate } = event else {
            panic!("expected a position, got {event:?}");
        };
        assert_eq!(attempt, 1);
        assert_eq!(coordinate.latitude(), 40.7128);
    }

    #[test]
    fn geolocation_error_body_is_malformed() {
        let event = decode_response(
            200,
            br#"{"error": true, "reason": "RateLimited"}"#,
            &ctx(RequestTag::Geolocate { attempt: 4 }),
        );
        assert!(matches!(
            event,
            Event::PositionFailed { attempt: 4, failure: LocationFailure::Malformed(_) }
        ));
    }

    #[test]
    fn categories_decode() {
        let body = br#"[{"id":"c1","name":"Free Food","description":"","icon":"pizza"}]"#;
        let Event::CategoriesLoaded(Ok(list)) = decode_response(200, body, &ctx(RequestTag::Categories)) else {
            panic!("expected categories");
        };
        assert_eq!(list[0].id, "c1");
    }
}
