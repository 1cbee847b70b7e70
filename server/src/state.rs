use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    AccessTokens, BookingDesk, EventCatalog, EventGate, MediaStorage, ProjectCatalog,
    RandomTokens, TokenGenerator,
};
use crate::store::{BookingStore, EventStore, ProjectStore};

/// Shared handles for every request. Services are cheap views built per call.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenGenerator>,
}

impl AppState {
    pub fn new<S>(config: Config, store: Arc<S>, media: Arc<dyn MediaStorage>) -> Self
    where
        S: EventStore + BookingStore + ProjectStore + 'static,
    {
        let tokens = Arc::new(RandomTokens::new(config.access_token_bytes));
        Self {
            config: Arc::new(config),
            events: store.clone(),
            bookings: store.clone(),
            projects: store,
            media,
            tokens,
        }
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn gate(&self) -> EventGate {
        EventGate::new(self.events.clone())
    }

    pub fn access_tokens(&self) -> AccessTokens {
        AccessTokens::new(self.events.clone(), self.tokens.clone())
    }

    pub fn catalog(&self) -> EventCatalog {
        EventCatalog::new(self.events.clone(), self.media.clone(), self.access_tokens())
    }

    pub fn booking_desk(&self) -> BookingDesk {
        BookingDesk::new(self.bookings.clone())
    }

    pub fn project_catalog(&self) -> ProjectCatalog {
        ProjectCatalog::new(self.projects.clone(), self.media.clone())
    }
}
