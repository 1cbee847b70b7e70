use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Access, Booking, Event, NewBooking, Project, ProjectContent};
use crate::store::{
    BookingStore, EventStore, EventUpdate, NewEvent, ProjectStore, StoreError,
};

/// In-process store. Every write holds the single lock, so the access pair
/// and the token index always change together.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, Event>,
    tokens: HashMap<String, Uuid>,
    bookings: Vec<Booking>,
    projects: HashMap<Uuid, Project>,
}

impl Inner {
    fn claim_token(&self, id: Uuid, access: &Access) -> Result<(), StoreError> {
        match access.token().and_then(|token| self.tokens.get(token)) {
            Some(owner) if *owner != id => Err(StoreError::TokenConflict),
            _ => Ok(()),
        }
    }

    fn apply_access(&mut self, id: Uuid, access: Access) -> Option<&mut Event> {
        let event = self.events.get_mut(&id)?;
        if let Some(old) = event.access_token.take() {
            self.tokens.remove(&old);
        }
        event.is_private = access.is_private();
        event.access_token = access.token().map(str::to_owned);
        if let Some(token) = &event.access_token {
            self.tokens.insert(token.clone(), id);
        }
        event.updated_at = Utc::now();
        Some(event)
    }

    fn booked_seats(&self, event_id: Uuid) -> i64 {
        self.bookings
            .iter()
            .filter(|booking| booking.event_id == event_id)
            .map(|booking| i64::from(booking.seats))
            .sum()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as-is, skipping the access-pair checks.
    #[cfg(test)]
    pub(crate) async fn seed(&self, event: Event) {
        let mut inner = self.inner.write().await;
        if let Some(token) = &event.access_token {
            inner.tokens.insert(token.clone(), event.id);
        }
        inner.events.insert(event.id, event);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_public(&self) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| !event.is_private)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(events)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner.events.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|id| inner.events.get(id))
            .cloned())
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().await;
        let id = Uuid::new_v4();
        inner.claim_token(id, &event.access)?;

        let now = Utc::now();
        let record = Event {
            id,
            name: event.content.name,
            description: event.content.description,
            date: event.content.date,
            capacity: event.content.capacity,
            location: event.content.location,
            cover: event.cover,
            is_private: event.access.is_private(),
            access_token: event.access.token().map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        if let Some(token) = &record.access_token {
            inner.tokens.insert(token.clone(), id);
        }
        inner.events.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, update: EventUpdate) -> Result<Option<Event>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&id) {
            return Ok(None);
        }
        inner.claim_token(id, &update.access)?;

        let Some(event) = inner.apply_access(id, update.access) else {
            return Ok(None);
        };
        event.name = update.content.name;
        event.description = update.content.description;
        event.date = update.content.date;
        event.capacity = update.content.capacity;
        event.location = update.content.location;
        if let Some(cover) = update.cover {
            event.cover = Some(cover);
        }
        Ok(Some(event.clone()))
    }

    async fn set_access(&self, id: Uuid, access: Access) -> Result<Option<Event>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&id) {
            return Ok(None);
        }
        inner.claim_token(id, &access)?;
        Ok(inner.apply_access(id, access).map(|event| event.clone()))
    }

    async fn rotate_token(&self, id: Uuid, token: String) -> Result<Option<Event>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.events.get(&id) {
            Some(event) if event.is_private => {}
            _ => return Ok(None),
        }
        let access = Access::private(token);
        inner.claim_token(id, &access)?;
        Ok(inner.apply_access(id, access).map(|event| event.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(event) = inner.events.remove(&id) else {
            return Ok(None);
        };
        if let Some(token) = &event.access_token {
            inner.tokens.remove(token);
        }
        inner.bookings.retain(|booking| booking.event_id != id);
        Ok(Some(event))
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn bookings_for(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|booking| booking.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn booked_seats(&self, event_id: Uuid) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.booked_seats(event_id))
    }

    async fn insert_booking(
        &self,
        event_id: Uuid,
        booking: NewBooking,
    ) -> Result<Option<Booking>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(capacity) = inner.events.get(&event_id).map(|event| event.capacity) else {
            return Ok(None);
        };

        let remaining = i64::from(capacity) - inner.booked_seats(event_id);
        if i64::from(booking.seats) > remaining {
            return Err(StoreError::CapacityExceeded {
                remaining: remaining.max(0),
            });
        }

        let record = Booking {
            id: Uuid::new_v4(),
            event_id,
            name: booking.name,
            email: booking.email,
            phone: booking.phone,
            seats: booking.seats,
            created_at: Utc::now(),
        };
        inner.bookings.push(record.clone());
        Ok(Some(record))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn insert_project(
        &self,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Project, StoreError> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: content.name,
            description: content.description,
            image,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Option<Project>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(project) = inner.projects.get_mut(&id) else {
            return Ok(None);
        };
        project.name = content.name;
        project.description = content.description;
        if image.is_some() {
            project.image = image;
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.inner.write().await.projects.remove(&id))
    }
}
