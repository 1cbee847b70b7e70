//! Read boundary for events. Every public read goes through [`EventGate`].

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::models::{AdminContext, Event};
use crate::services::ServiceError;
use crate::store::EventStore;

#[derive(Clone)]
pub struct EventGate {
    store: Arc<dyn EventStore>,
}

impl EventGate {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn list_public(&self) -> Result<Vec<Event>, ServiceError> {
        let mut events = self.store.list_public().await?;
        events.retain(is_publicly_visible);
        Ok(events)
    }

    /// Private and absent events fail identically.
    pub async fn get_by_id_for_public(&self, id: &str) -> Result<Event, ServiceError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Err(ServiceError::event_not_found());
        };

        match self.store.find_by_id(id).await? {
            Some(event) if is_publicly_visible(&event) => Ok(event),
            _ => Err(ServiceError::event_not_found()),
        }
    }

    /// The only non-administrator path that can return a private event.
    pub async fn get_by_token(&self, token: &str) -> Result<Event, ServiceError> {
        if token.is_empty() {
            return Err(ServiceError::event_not_found());
        }

        let event = self
            .store
            .find_by_token(token)
            .await?
            .filter(|event| event.access_token.as_deref() == Some(token))
            .ok_or_else(ServiceError::event_not_found)?;
        debug!(event_id = %event.id, "Event resolved through private link");
        Ok(event)
    }

    pub async fn get_for_admin(
        &self,
        _admin: &AdminContext,
        id: Uuid,
    ) -> Result<Event, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(ServiceError::event_not_found)
    }

    pub async fn list_for_admin(&self, _admin: &AdminContext) -> Result<Vec<Event>, ServiceError> {
        Ok(self.store.list_all().await?)
    }
}

fn is_publicly_visible(event: &Event) -> bool {
    !event.is_private
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::sample_content;
    use crate::models::Access;
    use crate::store::{MemoryStore, NewEvent};
    use chrono::{Duration, Utc};

    async fn setup() -> (EventGate, Event, Event) {
        let store = Arc::new(MemoryStore::new());
        let open = store
            .insert(NewEvent {
                content: sample_content("open day", Utc::now() + Duration::days(2)),
                cover: None,
                access: Access::public(),
            })
            .await
            .unwrap();
        let hidden = store
            .insert(NewEvent {
                content: sample_content("board dinner", Utc::now() + Duration::days(4)),
                cover: None,
                access: Access::private("s3cret".into()),
            })
            .await
            .unwrap();
        (EventGate::new(store), open, hidden)
    }

    #[tokio::test]
    async fn listing_never_includes_private_events() {
        let (gate, open, hidden) = setup().await;
        let ids: Vec<Uuid> = gate.list_public().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![open.id]);
        assert!(!ids.contains(&hidden.id));
    }

    #[tokio::test]
    async fn private_by_id_is_indistinguishable_from_missing() {
        let (gate, _, hidden) = setup().await;

        let private = gate.get_by_id_for_public(&hidden.id.to_string()).await.unwrap_err();
        let missing = gate
            .get_by_id_for_public(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        let garbage = gate.get_by_id_for_public("not-a-uuid").await.unwrap_err();

        assert_eq!(private, missing);
        assert_eq!(private, garbage);
        assert_eq!(private.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn public_event_by_id() {
        let (gate, open, _) = setup().await;
        assert_eq!(gate.get_by_id_for_public(&open.id.to_string()).await.unwrap().id, open.id);
    }

    #[tokio::test]
    async fn token_resolves_only_its_event() {
        let (gate, _, hidden) = setup().await;

        assert_eq!(gate.get_by_token("s3cret").await.unwrap().id, hidden.id);
        for miss in ["", "s3cre", "S3CRET", "s3cret "] {
            assert_eq!(
                gate.get_by_token(miss).await.unwrap_err(),
                ServiceError::event_not_found(),
                "token {miss:?}"
            );
        }
    }

    #[tokio::test]
    async fn admin_sees_private_events() {
        let (gate, _, hidden) = setup().await;
        let admin = AdminContext::new("ops");

        assert_eq!(gate.get_for_admin(&admin, hidden.id).await.unwrap().id, hidden.id);
        assert_eq!(gate.list_for_admin(&admin).await.unwrap().len(), 2);
        assert_eq!(
            gate.get_for_admin(&admin, Uuid::new_v4()).await.unwrap_err(),
            ServiceError::event_not_found()
        );
    }
}
