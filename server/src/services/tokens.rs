//! Issuance and rotation of private-event access tokens.

use std::future::Future;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Access, AdminContext, Event};
use crate::services::ServiceError;
use crate::store::{EventStore, StoreError};

/// 128 bits.
pub const MIN_TOKEN_BYTES: usize = 16;
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Attempts before a persistent token collision is reported.
const MAX_ISSUE_ATTEMPTS: usize = 3;

pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Hex-encoded bytes from the operating system CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokens {
    bytes: usize,
}

impl RandomTokens {
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_TOKEN_BYTES),
        }
    }
}

impl Default for RandomTokens {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

impl TokenGenerator for RandomTokens {
    fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        OsRng.fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

/// What a privacy change has to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AccessPlan {
    Keep(Access),
    IssueFresh,
}

/// Access state an event should end up with when `want_private` is requested.
///
/// Going private always gets a token the event never had; a private event
/// that already holds one keeps it.
pub(crate) fn plan_access(current: &Event, want_private: bool) -> AccessPlan {
    if !want_private {
        return AccessPlan::Keep(Access::public());
    }
    match current.access() {
        Some(access) if access.is_private() => AccessPlan::Keep(access),
        _ => AccessPlan::IssueFresh,
    }
}

#[derive(Clone)]
pub struct AccessTokens {
    store: Arc<dyn EventStore>,
    generator: Arc<dyn TokenGenerator>,
}

impl AccessTokens {
    pub fn new(store: Arc<dyn EventStore>, generator: Arc<dyn TokenGenerator>) -> Self {
        Self { store, generator }
    }

    /// Replaces the token of a private event; the previous one stops resolving.
    pub async fn regenerate_token(
        &self,
        admin: &AdminContext,
        id: Uuid,
    ) -> Result<Event, ServiceError> {
        let event = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;
        if !event.is_private {
            return Err(not_private());
        }

        let store = &self.store;
        let rotated = self
            .issue(event.access_token.as_deref(), move |token| {
                store.rotate_token(id, token)
            })
            .await?;

        match rotated {
            Some(event) => {
                info!(event_id = %id, admin = %admin.name, "Access token regenerated");
                Ok(event)
            }
            // Deleted or made public between the read and the write.
            None => match self.store.find_by_id(id).await? {
                Some(_) => Err(not_private()),
                None => Err(ServiceError::event_not_found()),
            },
        }
    }

    pub async fn set_privacy(
        &self,
        admin: &AdminContext,
        id: Uuid,
        is_private: bool,
    ) -> Result<Event, ServiceError> {
        let event = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;

        let store = &self.store;
        let updated = match plan_access(&event, is_private) {
            AccessPlan::Keep(access) if Some(&access) == event.access().as_ref() => {
                return Ok(event);
            }
            AccessPlan::Keep(access) => store.set_access(id, access).await?,
            AccessPlan::IssueFresh => {
                self.issue(event.access_token.as_deref(), move |token| {
                    store.set_access(id, Access::private(token))
                })
                .await?
            }
        };

        let updated = updated.ok_or_else(ServiceError::event_not_found)?;
        info!(
            event_id = %id,
            admin = %admin.name,
            is_private = updated.is_private,
            "Event privacy updated"
        );
        Ok(updated)
    }

    pub async fn toggle_privacy(
        &self,
        admin: &AdminContext,
        id: Uuid,
    ) -> Result<Event, ServiceError> {
        let event = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;
        self.set_privacy(admin, id, !event.is_private).await
    }

    /// A token that differs from `previous`.
    pub(crate) fn fresh_token(&self, previous: Option<&str>) -> String {
        loop {
            let token = self.generator.generate();
            if Some(token.as_str()) != previous {
                return token;
            }
        }
    }

    /// Runs `write` with a fresh token, retrying with a new one on collision.
    pub(crate) async fn issue<T, F, Fut>(
        &self,
        previous: Option<&str>,
        mut write: F,
    ) -> Result<T, ServiceError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            match write(self.fresh_token(previous)).await {
                Ok(value) => return Ok(value),
                Err(StoreError::TokenConflict) => {
                    warn!(attempt, "Access token collided with an existing one");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ServiceError::OperationFailed(
            "Failed to generate a unique private URL".to_string(),
        ))
    }
}

fn not_private() -> ServiceError {
    ServiceError::InvalidOperation("This is not a private event".to_string())
}
