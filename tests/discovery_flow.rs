//! End-to-end discovery flows driven through `handle_event`, with web replies
//! fed back exactly as the plugin host would deliver them.

use serde_json::{json, Value};
use zerocost::domain::Category;
use zerocost::engine::FetchStatus;
use zerocost::remote::{ApiCall, HttpMethod, RequestTag};
use zerocost::{handle_event, initialize, Action, AppState, Config, Coordinate, Event, LocationSource};

fn nearby_calls(actions: &[Action]) -> Vec<&ApiCall> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::Http(call) if matches!(call.context.tag, RequestTag::Nearby { .. }) => Some(call),
            _ => None,
        })
        .collect()
}

fn body(call: &ApiCall) -> Value {
    serde_json::from_slice(&call.body).unwrap()
}

fn reply(call: &ApiCall, status: u16, payload: &Value) -> Event {
    Event::WebResponse {
        status,
        body: serde_json::to_vec(payload).unwrap(),
        context: call.context.to_map(),
    }
}

fn events_payload() -> Value {
    json!([
        {
            "id": "evt-7",
            "title": "Pizza Night",
            "description": "Slices for everyone",
            "latitude": 40.7130,
            "longitude": -74.0050,
            "address": "1 Main St",
            "startTime": "2026-10-20T18:00:00Z",
            "category": "Free Food",
            "source": "community",
            "distanceKm": 0.4
        },
        {
            "id": "evt-42",
            "title": "Book Swap",
            "latitude": 40.7300,
            "longitude": -73.9900,
            "startTime": "2026-10-21T15:30:00Z",
            "category": "Giveaways",
            "distanceKm": 2.1
        }
    ])
}

fn started(location: LocationSource) -> (AppState, Vec<Action>) {
    let config = Config {
        location,
        ..Config::default()
    };
    let mut state = initialize(&config);
    let (_, actions) = handle_event(&mut state, &Event::Start).unwrap();
    (state, actions)
}

#[test]
fn disabled_location_fetches_once_around_the_fallback() {
    let (state, actions) = started(LocationSource::Off);

    let calls = nearby_calls(&actions);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, HttpMethod::Post);
    assert!(calls[0].url.ends_with("/api/v1/events/nearby"));

    let query = body(calls[0]);
    assert_eq!(query["latitude"], json!(37.7749));
    assert_eq!(query["longitude"], json!(-122.4194));
    assert_eq!(query["maxDistanceKm"], json!(50.0));
    assert!(query.get("query").is_none());
    assert!(query.get("preferredCategoryIds").is_none());

    assert_eq!(state.resolver.coordinate(), Some(state.config.fallback));
    assert!(state.fetch.is_loading());
}

#[test]
fn selection_is_shared_by_list_and_map() {
    let (mut state, actions) = started(LocationSource::Fixed(Coordinate::new(40.7128, -74.006).unwrap()));
    let call = nearby_calls(&actions)[0].clone();
    handle_event(&mut state, &reply(&call, 200, &events_payload())).unwrap();
    assert_eq!(state.events().len(), 2);

    // Select the second event from the list; selecting never refetches.
    let (_, moved) = handle_event(&mut state, &Event::Next).unwrap();
    let (render, selected) = handle_event(&mut state, &Event::Activate).unwrap();
    assert!(render);
    assert!(moved.is_empty());
    assert!(selected.is_empty());
    assert_eq!(state.selection.current(), Some("evt-42"));

    let vm = state.compute_viewmodel(40, 120);
    let selected_rows: Vec<_> = vm.list.items.iter().filter(|i| i.is_selected).map(|i| i.id.as_str()).collect();
    assert_eq!(selected_rows, vec!["evt-42"]);

    let map = vm.map.expect("wide screens show the map");
    let selected_markers: Vec<_> = map.markers.iter().filter(|m| m.selected).map(|m| m.id.as_str()).collect();
    assert_eq!(selected_markers, vec!["evt-42"]);
    assert_eq!(vm.popup.map(|p| p.id), Some("evt-42".to_string()));

    // A refetch that drops the selected event clears the selection everywhere.
    let (_, actions) = handle_event(&mut state, &Event::WidenRadius).unwrap();
    let call = nearby_calls(&actions)[0].clone();
    let only_pizza = json!([events_payload()[0].clone()]);
    handle_event(&mut state, &reply(&call, 200, &only_pizza)).unwrap();

    assert_eq!(state.selection.current(), None);
    let vm = state.compute_viewmodel(40, 120);
    assert!(vm.list.items.iter().all(|i| !i.is_selected));
    assert!(vm.map.unwrap().markers.iter().all(|m| !m.selected));
    assert!(vm.popup.is_none());
}

#[test]
fn failed_fetch_keeps_filters_and_retries_the_same_query() {
    let (mut state, _) = started(LocationSource::Fixed(Coordinate::new(40.7128, -74.006).unwrap()));

    handle_event(&mut state, &Event::SearchMode).unwrap();
    for c in "food".chars() {
        handle_event(&mut state, &Event::Char(c)).unwrap();
    }
    let (_, actions) = handle_event(&mut state, &Event::Activate).unwrap();
    let failed = nearby_calls(&actions)[0].clone();
    assert_eq!(body(&failed)["query"], json!("food"));

    handle_event(&mut state, &reply(&failed, 503, &json!({"error": "unavailable"}))).unwrap();
    assert!(matches!(state.fetch.status(), FetchStatus::Failed(_)));
    assert_eq!(state.filters.current().query, "food");

    let vm = state.compute_viewmodel(40, 120);
    assert!(vm.list.error.is_some());

    let (_, actions) = handle_event(&mut state, &Event::Retry).unwrap();
    let retried = nearby_calls(&actions);
    assert_eq!(retried.len(), 1);
    assert_eq!(retried[0].body, failed.body);
    assert_eq!(retried[0].url, failed.url);
    assert_ne!(retried[0].context.tag, failed.context.tag);

    // The failed request answering late must not clobber the retry.
    handle_event(&mut state, &reply(&failed, 200, &events_payload())).unwrap();
    assert!(state.fetch.is_loading());
    handle_event(&mut state, &reply(retried[0], 200, &events_payload())).unwrap();
    assert!(matches!(state.fetch.status(), FetchStatus::Succeeded(_)));
}

#[test]
fn service_payloads_with_extra_fields_decode() {
    let (mut state, actions) = started(LocationSource::Fixed(Coordinate::new(40.7128, -74.006).unwrap()));
    let call = nearby_calls(&actions)[0].clone();
    let payload = json!([
        {
            "id": "3f2b8c1e-7a4d-4e0b-9c55-0d6a1f2e9b11",
            "title": "Open Mic",
            "description": "Bring an instrument",
            "latitude": 40.7150,
            "longitude": -74.0010,
            "address": "22 Bleecker St",
            "startTime": "2026-10-20T19:30:00.123456Z",
            "endTime": "2026-10-20T22:00:00.5Z",
            "category": "Music",
            "categoryId": "cat-music",
            "source": "meetup",
            "sourceId": "mu-991",
            "sourceUrl": "https://example.org/open-mic",
            "organizerName": "Village Collective",
            "capacity": 40,
            "isVerified": true,
            "createdAt": "2026-10-01T08:00:00.000Z",
            "distanceKm": 0.6,
            "score": 0.82,
            "tags": ["music", "free"]
        }
    ]);
    handle_event(&mut state, &reply(&call, 200, &payload)).unwrap();

    let events = state.events();
    assert_eq!(events.len(), 1);
    let record = events.get("3f2b8c1e-7a4d-4e0b-9c55-0d6a1f2e9b11").unwrap();
    assert_eq!(record.category, Category::Other);
    assert!(record.is_verified);
    assert_eq!(record.capacity, Some(40));
    assert_eq!(record.organizer_name.as_deref(), Some("Village Collective"));
}
