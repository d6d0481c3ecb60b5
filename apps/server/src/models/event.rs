//! Event domain types and the discovery projection.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Event access scope. Discovery only ever surfaces `public` events unless
/// the request is scoped to a specific user's attended events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "unlisted" => Some(Self::Unlisted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Unlisted => "unlisted",
        }
    }
}

/// Internal event category enum (stored in `events.category`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Music,
    Sports,
    Culture,
    Other,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "music" => Some(Self::Music),
            "sports" => Some(Self::Sports),
            "culture" => Some(Self::Culture),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Sports => "sports",
            Self::Culture => "culture",
            Self::Other => "other",
        }
    }
}

/// Externally-facing event type vocabulary, distinct from the internal
/// category enum. The mapping is 1:1 and applied before filter criteria
/// reach the discovery engine.
pub const EXTERNAL_EVENT_TYPES: &[(&str, Category)] = &[
    ("concerts", Category::Music),
    ("sports", Category::Sports),
    ("culture", Category::Culture),
    ("other", Category::Other),
];

/// Map an external type name to its internal category. Unknown names yield
/// `None` and are skipped by the normalizer.
pub fn map_external_type(name: &str) -> Option<Category> {
    let lower = name.to_ascii_lowercase();
    EXTERNAL_EVENT_TYPES
        .iter()
        .find(|(external, _)| *external == lower)
        .map(|(_, category)| *category)
}

/// Result ordering for discovery queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Creation time descending.
    #[default]
    Newest,
    /// Max participants descending.
    Popular,
    /// Legacy event date ascending.
    Upcoming,
}

impl Sort {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "popular" => Some(Self::Popular),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popular => "popular",
            Self::Upcoming => "upcoming",
        }
    }
}

/// The fixed projection returned per event in discovery lists. Occurrence and
/// structured-location detail is never inlined here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub category: Category,
    pub cover_image_url: Option<String>,
    pub max_participants: Option<i32>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub is_online: bool,
    pub meeting_link: Option<String>,
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
