//! Administrator maintenance of events: create, update, delete.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Access, AdminContext, Event, EventContent, Translations};
use crate::services::media::{self, ImageUpload, MediaStorage, EVENT_COVER_DIR};
use crate::services::tokens::{plan_access, AccessPlan, AccessTokens};
use crate::services::validation::not_blank;
use crate::services::ServiceError;
use crate::store::{EventStore, EventUpdate, NewEvent};

/// Event form as submitted by an administrator, before validation.
#[derive(Debug, Clone, Default, Validate)]
pub struct EventInput {
    pub name: Translations,
    pub description: Translations,
    #[validate(required(message = "The date field is required."))]
    pub date: Option<DateTime<Utc>>,
    #[validate(
        required(message = "The capacity field is required."),
        range(min = 1, message = "The capacity must be at least 1.")
    )]
    pub capacity: Option<i32>,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    pub is_private: bool,
}

impl EventInput {
    pub fn to_content(&self) -> Result<EventContent, ServiceError> {
        self.validate()?;
        check_translations(&self.name, "name")?;
        check_translations(&self.description, "description")?;

        let (Some(date), Some(capacity)) = (self.date, self.capacity) else {
            return Err(invalid("The given data was invalid."));
        };
        Ok(EventContent {
            name: self.name.clone(),
            description: self.description.clone(),
            date,
            capacity,
            location: self.location.trim().to_string(),
        })
    }
}

fn check_translations(text: &Translations, field: &str) -> Result<(), ServiceError> {
    if let Some(locale) = text.unsupported_locales().first() {
        return Err(invalid(format!("Unsupported language '{locale}' for event {field}.")));
    }
    if !text.has_content() {
        return Err(invalid(format!(
            "Event {field} is required in at least one language."
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::Validation(message.into())
}

#[derive(Clone)]
pub struct EventCatalog {
    store: Arc<dyn EventStore>,
    media: Arc<dyn MediaStorage>,
    tokens: AccessTokens,
}

impl EventCatalog {
    pub fn new(
        store: Arc<dyn EventStore>,
        media: Arc<dyn MediaStorage>,
        tokens: AccessTokens,
    ) -> Self {
        Self {
            store,
            media,
            tokens,
        }
    }

    pub async fn create(
        &self,
        admin: &AdminContext,
        input: EventInput,
        cover: Option<ImageUpload>,
    ) -> Result<Event, ServiceError> {
        let content = input.to_content()?;
        let cover = cover.ok_or_else(|| invalid("The cover field is required."))?;
        let cover_key = self.store_image(&cover).await?;

        let store = &self.store;
        let result = if input.is_private {
            let (content, cover_key) = (&content, &cover_key);
            self.tokens
                .issue(None, move |token| {
                    store.insert(NewEvent {
                        content: content.clone(),
                        cover: Some(cover_key.clone()),
                        access: Access::private(token),
                    })
                })
                .await
        } else {
            store
                .insert(NewEvent {
                    content,
                    cover: Some(cover_key.clone()),
                    access: Access::public(),
                })
                .await
                .map_err(ServiceError::from)
        };

        match result {
            Ok(event) => {
                info!(event_id = %event.id, admin = %admin.name, is_private = event.is_private, "Event created");
                Ok(event)
            }
            Err(e) => {
                self.discard(&cover_key).await;
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        admin: &AdminContext,
        id: Uuid,
        input: EventInput,
        cover: Option<ImageUpload>,
    ) -> Result<Event, ServiceError> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;
        let content = input.to_content()?;

        let new_cover = match &cover {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let store = &self.store;
        let result = match plan_access(&current, input.is_private) {
            AccessPlan::Keep(access) => store
                .update(
                    id,
                    EventUpdate {
                        content,
                        cover: new_cover.clone(),
                        access,
                    },
                )
                .await
                .map_err(ServiceError::from),
            AccessPlan::IssueFresh => {
                let (content, new_cover) = (&content, &new_cover);
                self.tokens
                    .issue(current.access_token.as_deref(), move |token| {
                        store.update(
                            id,
                            EventUpdate {
                                content: content.clone(),
                                cover: new_cover.clone(),
                                access: Access::private(token),
                            },
                        )
                    })
                    .await
            }
        };

        let updated = match result {
            Ok(Some(event)) => event,
            Ok(None) => {
                self.discard_opt(new_cover.as_deref()).await;
                return Err(ServiceError::event_not_found());
            }
            Err(e) => {
                self.discard_opt(new_cover.as_deref()).await;
                return Err(e);
            }
        };

        if new_cover.is_some() {
            self.discard_opt(current.cover.as_deref()).await;
        }
        info!(event_id = %id, admin = %admin.name, is_private = updated.is_private, "Event updated");
        Ok(updated)
    }

    /// Removes the cover first so a failed removal leaves the record intact.
    pub async fn delete(&self, admin: &AdminContext, id: Uuid) -> Result<(), ServiceError> {
        let event = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;

        if let Some(cover) = &event.cover {
            self.media.remove(cover).await?;
        }
        self.store
            .delete(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)?;

        info!(event_id = %id, admin = %admin.name, "Event deleted");
        Ok(())
    }

    async fn store_image(&self, upload: &ImageUpload) -> Result<String, ServiceError> {
        upload.validate()?;
        let key = media::object_key(EVENT_COVER_DIR, &upload.file_name);
        self.media.put(&key, &upload.bytes).await?;
        Ok(key)
    }

    async fn discard(&self, key: &str) {
        if let Err(e) = self.media.remove(key).await {
            warn!(error = %e, key, "Failed to remove unused cover image");
        }
    }

    async fn discard_opt(&self, key: Option<&str>) {
        if let Some(key) = key {
            self.discard(key).await;
        }
    }
}
