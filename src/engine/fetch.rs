//! Event fetch controller.
//!
//! Derives a nearby-events query from (center, filters), tracks the
//! load/success/error lifecycle and enforces last-request-wins: every issued
//! request gets a generation number, and a completion whose generation is not
//! the latest one is discarded no matter when it arrives.
//!
//! ```text
//! Idle ──request──▶ Loading ──complete(ok)──▶ Succeeded
//!                      ▲     └─complete(err)─▶ Failed
//!                      └──── request / retry ────┘
//! ```

use crate::domain::{Coordinate, EventRecord, FilterState};
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

/// Default number of events requested per query.
pub const DEFAULT_LIMIT: u32 = 100;

/// Message shown to the user when a fetch fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load events. Please try again.";

/// Body of `POST /events/nearby`.
///
/// Doubles as the request key: two queries that compare equal would produce
/// the same remote call, so the controller skips the second one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub max_distance_km: f64,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_category_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl NearbyQuery {
    #[must_use]
    pub fn new(center: Coordinate, filters: &FilterState, limit: u32) -> Self {
        let categories: Vec<String> = filters.categories.iter().cloned().collect();
        let text = filters.query.trim();

        Self {
            latitude: center.latitude(),
            longitude: center.longitude(),
            max_distance_km: filters.max_distance_km,
            limit,
            preferred_category_ids: (!categories.is_empty()).then_some(categories),
            query: (!text.is_empty()).then(|| text.to_string()),
        }
    }
}

/// A request the caller must send, tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: NearbyQuery,
}

/// Why a fetch did not produce events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure or non-2xx status.
    Network(String),
    /// The body did not decode into event records.
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(detail) => write!(f, "network error: {detail}"),
            Self::Malformed(detail) => write!(f, "malformed payload: {detail}"),
        }
    }
}

/// Immutable ordered result set with an id index.
///
/// Cloning is cheap (two `Rc` bumps). A new set is built for every successful
/// fetch; nothing ever mutates one, so holding ids across fetches is safe while
/// holding references is not needed.
#[derive(Debug, Clone, Default)]
pub struct EventSet {
    records: Rc<[EventRecord]>,
    index: Rc<HashMap<String, usize>>,
}

impl EventSet {
    #[must_use]
    pub fn new(records: Vec<EventRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(pos);
        }
        Self {
            records: records.into(),
            index: Rc::new(index),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.index.get(id).and_then(|&pos| self.records.get(pos))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PartialEq for EventSet {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded(EventSet),
    Failed(String),
}

/// What happened to a completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A newer request was issued since; the result was dropped.
    Stale,
    /// The displayed event set was replaced.
    Replaced(EventSet),
    /// The request failed; the previous event set is still displayed.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FetchController {
    limit: u32,
    generation: u64,
    last_query: Option<NearbyQuery>,
    status: FetchStatus,
    displayed: EventSet,
}

impl Default for FetchController {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl FetchController {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            generation: 0,
            last_query: None,
            status: FetchStatus::Idle,
            displayed: EventSet::default(),
        }
    }

    /// Issues a fetch for (center, filters) if the request key changed.
    ///
    /// Returns `None` when the derived query equals the last issued one, so
    /// unrelated state changes never cause a refetch. Use [`Self::retry`] to
    /// repeat an identical request on purpose.
    pub fn request(&mut self, center: Coordinate, filters: &FilterState) -> Option<FetchTicket> {
        let query = NearbyQuery::new(center, filters, self.limit);
        if self.last_query.as_ref() == Some(&query) {
            tracing::debug!(generation = self.generation, "request key unchanged, not refetching");
            return None;
        }
        Some(self.issue(query))
    }

    /// Re-issues the last query unchanged. `None` if nothing was ever requested.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let query = self.last_query.clone()?;
        tracing::info!(generation = self.generation + 1, "manual retry");
        Some(self.issue(query))
    }

    /// Applies the outcome of the request tagged `generation`.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: std::result::Result<Vec<EventRecord>, FetchError>,
    ) -> Completion {
        if generation != self.generation {
            tracing::debug!(generation, latest = self.generation, "discarding stale fetch result");
            return Completion::Stale;
        }

        match outcome {
            Ok(records) => {
                let set = EventSet::new(records);
                tracing::info!(generation, count = set.len(), "events loaded");
                self.displayed = set.clone();
                self.status = FetchStatus::Succeeded(set.clone());
                Completion::Replaced(set)
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "fetch failed");
                self.status = FetchStatus::Failed(FETCH_FAILED_MESSAGE.to_string());
                Completion::Failed(FETCH_FAILED_MESSAGE.to_string())
            }
        }
    }

    #[must_use]
    pub const fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Event set currently on screen; kept while a newer request loads.
    #[must_use]
    pub const fn events(&self) -> &EventSet {
        &self.displayed
    }

    #[must_use]
    pub const fn last_query(&self) -> Option<&NearbyQuery> {
        self.last_query.as_ref()
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading)
    }

    fn issue(&mut self, query: NearbyQuery) -> FetchTicket {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.last_query = Some(query.clone());

        tracing::debug!(
            generation = self.generation,
            latitude = query.latitude,
            longitude = query.longitude,
            max_distance_km = query.max_distance_km,
            limit = query.limit,
            "issuing nearby request"
        );

        FetchTicket {
            generation: self.generation,
            query,
        }
    }
}
