//! Record stores for events, bookings and projects.
//!
//! Services talk to the traits below; `PgStore` backs them with Postgres and
//! `MemoryStore` keeps everything in process.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Access, Booking, Event, EventContent, NewBooking, Project, ProjectContent};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The access token is already assigned to another event.
    #[error("access token already in use")]
    TokenConflict,

    #[error("not enough seats left ({remaining} remaining)")]
    CapacityExceeded { remaining: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub content: EventContent,
    pub cover: Option<String>,
    pub access: Access,
}

#[derive(Debug, Clone)]
pub struct EventUpdate {
    pub content: EventContent,
    /// Replacement cover key; `None` keeps the stored one.
    pub cover: Option<String>,
    pub access: Access,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Non-private events, most recent `date` first.
    async fn list_public(&self) -> Result<Vec<Event>, StoreError>;

    /// Every event, most recently created first.
    async fn list_all(&self) -> Result<Vec<Event>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, StoreError>;

    async fn insert(&self, event: NewEvent) -> Result<Event, StoreError>;

    /// Rewrites content and access in one write. `None` when the event is gone.
    async fn update(&self, id: Uuid, update: EventUpdate) -> Result<Option<Event>, StoreError>;

    /// Replaces `(is_private, access_token)` atomically.
    async fn set_access(&self, id: Uuid, access: Access) -> Result<Option<Event>, StoreError>;

    /// Swaps in a new token only while the event is still private.
    ///
    /// `None` when the event is gone or no longer private.
    async fn rotate_token(&self, id: Uuid, token: String) -> Result<Option<Event>, StoreError>;

    /// Deletes the event and its bookings, returning the removed record.
    async fn delete(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn bookings_for(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    async fn booked_seats(&self, event_id: Uuid) -> Result<i64, StoreError>;

    /// Inserts the booking if the event still has room for it.
    ///
    /// `None` when the event no longer exists.
    async fn insert_booking(
        &self,
        event_id: Uuid,
        booking: NewBooking,
    ) -> Result<Option<Booking>, StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn insert_project(
        &self,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Project, StoreError>;

    /// `image` of `None` keeps the stored one.
    async fn update_project(
        &self,
        id: Uuid,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Option<Project>, StoreError>;

    async fn delete_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
}
