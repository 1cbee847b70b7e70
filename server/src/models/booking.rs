use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::validation::not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub seats: i32,
    pub created_at: DateTime<Utc>,
}

/// Reservation request submitted from an event page.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBooking {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_seats")]
    #[validate(range(min = 1, message = "The seats must be at least 1."))]
    pub seats: i32,
}

fn default_seats() -> i32 {
    1
}
