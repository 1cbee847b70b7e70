use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Access, Booking, Event, NewBooking, Project, ProjectContent, Translations};
use crate::store::{
    BookingStore, EventStore, EventUpdate, NewEvent, ProjectStore, StoreError,
};

const EVENT_COLUMNS: &str = "id, name, description, date, capacity, location, cover, \
                             is_private, access_token, created_at, updated_at";

const PROJECT_COLUMNS: &str = "id, name, description, image, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    name: Json<Translations>,
    description: Json<Translations>,
    date: DateTime<Utc>,
    capacity: i32,
    location: String,
    cover: Option<String>,
    is_private: bool,
    access_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            description: row.description.0,
            date: row.date,
            capacity: row.capacity,
            location: row.location,
            cover: row.cover,
            is_private: row.is_private,
            access_token: row.access_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: Json<Translations>,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description.0,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The only unique column written after creation is `access_token`.
fn map_write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::TokenConflict,
        _ => StoreError::Database(err),
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn list_public(&self) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE is_private = FALSE ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE access_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, name, description, date, capacity, location, cover,
                                is_private, access_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(Json(&event.content.name))
        .bind(Json(&event.content.description))
        .bind(event.content.date)
        .bind(event.content.capacity)
        .bind(&event.content.location)
        .bind(&event.cover)
        .bind(event.access.is_private())
        .bind(event.access.token())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, update: EventUpdate) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET name = $2,
                description = $3,
                date = $4,
                capacity = $5,
                location = $6,
                cover = COALESCE($7, cover),
                is_private = $8,
                access_token = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Json(&update.content.name))
        .bind(Json(&update.content.description))
        .bind(update.content.date)
        .bind(update.content.capacity)
        .bind(&update.content.location)
        .bind(&update.cover)
        .bind(update.access.is_private())
        .bind(update.access.token())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(Event::from))
    }

    async fn set_access(&self, id: Uuid, access: Access) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET is_private = $2, access_token = $3, updated_at = $4
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(access.is_private())
        .bind(access.token())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(Event::from))
    }

    async fn rotate_token(&self, id: Uuid, token: String) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET access_token = $2, updated_at = $3
            WHERE id = $1 AND is_private = TRUE
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(Event::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn bookings_for(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, event_id, name, email, phone, seats, created_at \
             FROM bookings WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn booked_seats(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let seats: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(seats), 0)::BIGINT FROM bookings WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(seats)
    }

    async fn insert_booking(
        &self,
        event_id: Uuid,
        booking: NewBooking,
    ) -> Result<Option<Booking>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent bookings for the same event.
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(capacity) = capacity else {
            return Ok(None);
        };

        let booked: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(seats), 0)::BIGINT FROM bookings WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let remaining = i64::from(capacity) - booked;
        if i64::from(booking.seats) > remaining {
            return Err(StoreError::CapacityExceeded {
                remaining: remaining.max(0),
            });
        }

        let record = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, event_id, name, email, phone, seats, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, event_id, name, email, phone, seats, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(booking.name)
        .bind(booking.email)
        .bind(booking.phone)
        .bind(booking.seats)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(record))
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn find_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn insert_project(
        &self,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Project, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (id, name, description, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(content.name)
        .bind(Json(content.description))
        .bind(image)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_project(
        &self,
        id: Uuid,
        content: ProjectContent,
        image: Option<String>,
    ) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET name = $2, description = $3, image = COALESCE($4, image), updated_at = $5
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content.name)
        .bind(Json(content.description))
        .bind(image)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn delete_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }
}
