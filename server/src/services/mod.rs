use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

pub mod bookings;
pub mod catalog;
pub mod gate;
pub mod media;
pub mod projects;
pub mod tokens;
pub mod validation;

pub use bookings::BookingDesk;
pub use catalog::{EventCatalog, EventInput};
pub use gate::EventGate;
pub use media::{ImageUpload, LocalMediaStorage, MediaError, MediaStorage};
pub use projects::{ProjectCatalog, ProjectInput};
pub use tokens::{AccessTokens, RandomTokens, TokenGenerator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Lookup miss. Private events are reported exactly like absent ones.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    OperationFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("Only {remaining} seat(s) remaining")]
    CapacityExceeded { remaining: i64 },
}

impl ServiceError {
    pub fn event_not_found() -> Self {
        ServiceError::NotFound("Event")
    }

    pub fn project_not_found() -> Self {
        ServiceError::NotFound("Project")
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TokenConflict => {
                ServiceError::OperationFailed("Access token collision".to_string())
            }
            StoreError::CapacityExceeded { remaining } => {
                ServiceError::CapacityExceeded { remaining }
            }
            StoreError::Database(e) => {
                error!(error = ?e, "Store operation failed");
                ServiceError::OperationFailed("Storage is unavailable".to_string())
            }
        }
    }
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Rejected(reason) => ServiceError::Validation(reason),
            other => {
                error!(error = ?other, "Media operation failed");
                ServiceError::OperationFailed("Could not store the uploaded file".to_string())
            }
        }
    }
}
