//! Event records and category metadata received from the remote service.
//!
//! [`EventRecord`] is a read-only projection: the engine never edits one in
//! place, it only replaces whole result sets. Field names follow the service's
//! camelCase JSON.

use super::coordinate::Coordinate;
use super::error::{Result, ZeroCostError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of event categories.
///
/// Labels the service does not know about decode as [`Category::Other`] rather
/// than failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Free Food")]
    FreeFood,
    #[serde(rename = "Campus Events")]
    CampusEvents,
    #[serde(rename = "Community Events")]
    CommunityEvents,
    #[serde(rename = "Giveaways")]
    Giveaways,
    #[serde(rename = "Workshops")]
    Workshops,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Sports")]
    Sports,
    #[serde(rename = "Health & Wellness")]
    HealthAndWellness,
    #[serde(other)]
    Other,
}

impl Category {
    /// The selectable categories, in toggle-key order (`1`..`8`).
    pub const SELECTABLE: [Self; 8] = [
        Self::FreeFood,
        Self::CampusEvents,
        Self::CommunityEvents,
        Self::Giveaways,
        Self::Workshops,
        Self::Entertainment,
        Self::Sports,
        Self::HealthAndWellness,
    ];

    /// Human-readable label, identical to the service's wire name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FreeFood => "Free Food",
            Self::CampusEvents => "Campus Events",
            Self::CommunityEvents => "Community Events",
            Self::Giveaways => "Giveaways",
            Self::Workshops => "Workshops",
            Self::Entertainment => "Entertainment",
            Self::Sports => "Sports",
            Self::HealthAndWellness => "Health & Wellness",
            Self::Other => "Other",
        }
    }

    /// Single-cell glyph drawn for this category on the terminal map.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::FreeFood => 'F',
            Self::CampusEvents => 'C',
            Self::CommunityEvents => 'M',
            Self::Giveaways => 'G',
            Self::Workshops => 'W',
            Self::Entertainment => 'E',
            Self::Sports => 'S',
            Self::HealthAndWellness => 'H',
            Self::Other => '*',
        }
    }

    /// Looks up a category by its label, case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::SELECTABLE
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One discoverable free event as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(default)]
    pub address: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub category: Category,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub organizer_name: Option<String>,
    #[serde(default)]
    pub organizer_contact: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Distance from the query center, computed by the service.
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// Relevance score in [0, 1], computed by the service.
    #[serde(default)]
    pub score: Option<f64>,
}

impl EventRecord {
    /// Checks the invariants the service promises but JSON cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCostError::FetchFailed`] for an empty id, a negative
    /// distance or a score outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ZeroCostError::FetchFailed("event with empty id".to_string()));
        }
        if let Some(distance) = self.distance_km {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ZeroCostError::FetchFailed(format!(
                    "event {} has invalid distance {distance}",
                    self.id
                )));
            }
        }
        if let Some(score) = self.score {
            if !(0.0..=1.0).contains(&score) {
                return Err(ZeroCostError::FetchFailed(format!(
                    "event {} has invalid score {score}",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Whether the event starts within `window` from `now` (and has not started yet).
    #[must_use]
    pub fn starts_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        let until = self.start_time - now;
        until >= chrono::Duration::zero() && until < window
    }
}

/// Decodes a nearby/search payload into records, validating each one.
///
/// # Errors
///
/// Returns a decode error for invalid JSON or schema mismatch, and
/// [`ZeroCostError::FetchFailed`] when a record violates its invariants.
pub fn decode_events(body: &[u8]) -> Result<Vec<EventRecord>> {
    let records: Vec<EventRecord> = serde_json::from_slice(body)?;
    for record in &records {
        record.validate()?;
    }
    Ok(records)
}

/// Category metadata served by `GET /categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// Maps the selectable categories to the identifiers sent upstream.
///
/// Until metadata has been loaded, a category's identifier is its label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    entries: Vec<CategoryInfo>,
}

impl CategoryCatalog {
    #[must_use]
    pub fn new(entries: Vec<CategoryInfo>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Identifier for `category`, falling back to its label.
    #[must_use]
    pub fn id_for(&self, category: Category) -> String {
        self.entries
            .iter()
            .find(|info| Category::from_label(&info.name) == Some(category))
            .map_or_else(|| category.label().to_string(), |info| info.id.clone())
    }

    /// Display label for an identifier produced by [`Self::id_for`].
    #[must_use]
    pub fn label_for(&self, id: &str) -> String {
        self.entries
            .iter()
            .find(|info| info.id == id)
            .map_or_else(|| id.to_string(), |info| info.name.clone())
    }

    /// Translates identifiers chosen before metadata arrived (plain labels)
    /// into the service's identifiers. Unknown entries pass through.
    #[must_use]
    pub fn canonicalize<'a, I>(&self, ids: I) -> std::collections::BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        ids.into_iter()
            .map(|id| Category::from_label(id).map_or_else(|| id.clone(), |c| self.id_for(c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
        {
            "id": "evt-1",
            "title": "Pizza on the quad",
            "description": "Leftover pizza from the hackathon",
            "latitude": 37.77,
            "longitude": -122.41,
            "address": "1 Campus Way",
            "startTime": "2026-10-19T18:00:00Z",
            "category": "Free Food",
            "categoryId": "c-food",
            "source": "reddit",
            "sourceUrl": "https://example.org/p/1",
            "isVerified": true,
            "distanceKm": 1.2,
            "score": 0.8
        },
        {
            "id": "evt-2",
            "title": "Board game night",
            "latitude": 37.78,
            "longitude": -122.40,
            "startTime": "2026-10-20T02:00:00Z",
            "category": "Tabletop"
        }
    ]"#;

    #[test]
    fn decodes_camel_case_payload() {
        let events = decode_events(PAYLOAD.as_bytes()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category, Category::FreeFood);
        assert_eq!(events[0].location.latitude(), 37.77);
        assert_eq!(events[0].distance_km, Some(1.2));
        assert_eq!(events[1].category, Category::Other);
        assert!(events[1].source_url.is_none());
    }

    #[test]
    fn rejects_out_of_range_score() {
        let body = r#"[{"id":"x","title":"t","latitude":0,"longitude":0,
            "startTime":"2026-01-01T00:00:00Z","category":"Sports","score":1.5}]"#;
        assert!(decode_events(body.as_bytes()).is_err());
    }

    #[test]
    fn rejects_out_of_range_location() {
        let body = r#"[{"id":"x","title":"t","latitude":120,"longitude":0,
            "startTime":"2026-01-01T00:00:00Z","category":"Sports"}]"#;
        assert!(decode_events(body.as_bytes()).is_err());
    }

    #[test]
    fn catalog_prefers_service_ids() {
        let mut catalog = CategoryCatalog::default();
        assert_eq!(catalog.id_for(Category::Giveaways), "Giveaways");

        catalog = CategoryCatalog::new(vec![CategoryInfo {
            id: "3f1c".to_string(),
            name: "giveaways".to_string(),
            description: String::new(),
            icon: String::new(),
        }]);
        assert_eq!(catalog.id_for(Category::Giveaways), "3f1c");
        assert_eq!(catalog.id_for(Category::Sports), "Sports");
        assert_eq!(catalog.label_for("3f1c"), "giveaways");

        let chosen: std::collections::BTreeSet<String> =
            ["Giveaways".to_string(), "Sports".to_string()].into_iter().collect();
        let ids = catalog.canonicalize(&chosen);
        assert!(ids.contains("3f1c"));
        assert!(ids.contains("Sports"));
    }

    #[test]
    fn starting_soon_window() {
        let events = decode_events(PAYLOAD.as_bytes()).unwrap();
        let now = "2026-10-19T17:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(events[0].starts_within(now, chrono::Duration::hours(2)));
        assert!(!events[1].starts_within(now, chrono::Duration::hours(2)));
    }
}
