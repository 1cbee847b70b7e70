use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::translations::{Locale, Translations};

/// Event record as persisted, including its access state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: Translations,
    pub description: Translations,
    pub date: DateTime<Utc>,
    pub capacity: i32,
    pub location: String,
    pub cover: Option<String>,
    pub is_private: bool,
    pub access_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrator-editable content fields of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventContent {
    pub name: Translations,
    pub description: Translations,
    pub date: DateTime<Utc>,
    pub capacity: i32,
    pub location: String,
}

/// The `(is_private, access_token)` pair. Stores write both fields together.
///
/// A private access always carries a token; a public one never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    is_private: bool,
    token: Option<String>,
}

impl Access {
    pub fn public() -> Self {
        Self {
            is_private: false,
            token: None,
        }
    }

    pub fn private(token: String) -> Self {
        Self {
            is_private: true,
            token: Some(token),
        }
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Event {
    /// Current access pair, or `None` when the stored row is private without a token.
    pub fn access(&self) -> Option<Access> {
        match (self.is_private, &self.access_token) {
            (false, _) => Some(Access::public()),
            (true, Some(token)) => Some(Access::private(token.clone())),
            (true, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatSummary {
    pub booked_seats: i64,
    pub remaining_seats: i64,
}

impl SeatSummary {
    pub fn new(capacity: i32, booked_seats: i64) -> Self {
        Self {
            booked_seats,
            remaining_seats: (i64::from(capacity) - booked_seats).max(0),
        }
    }
}

/// Public projection of an event. Never carries the access token.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub id: Uuid,
    pub name: Translations,
    pub description: Translations,
    pub display_name: Option<String>,
    pub display_description: Option<String>,
    pub date: DateTime<Utc>,
    pub capacity: i32,
    pub location: String,
    pub cover_url: Option<String>,
    #[serde(flatten)]
    pub seats: Option<SeatSummary>,
}

impl EventView {
    pub fn new(event: &Event, locale: &Locale) -> Self {
        Self {
            id: event.id,
            display_name: event.name.resolve(locale).map(str::to_owned),
            display_description: event.description.resolve(locale).map(str::to_owned),
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date,
            capacity: event.capacity,
            location: event.location.clone(),
            cover_url: event.cover.as_deref().map(crate::services::media::public_path),
            seats: None,
        }
    }

    pub fn with_seats(mut self, seats: SeatSummary) -> Self {
        self.seats = Some(seats);
        self
    }
}

/// Payload of the public and private-link detail pages. `private_event` tells
/// the client to hide navigation that would leak the link.
#[derive(Debug, Serialize)]
pub struct EventPage {
    pub event: EventView,
    pub private_event: bool,
}

#[cfg(test)]
pub(crate) fn sample_content(name: &str, date: DateTime<Utc>) -> EventContent {
    EventContent {
        name: [("en", name)].into_iter().collect(),
        description: [("en", "An evening with the team")].into_iter().collect(),
        date,
        capacity: 40,
        location: "Main hall".to_string(),
    }
}
