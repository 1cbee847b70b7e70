//! Event administration. Every handler runs behind `require_admin`.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::handlers::forms::FormFields;
use crate::models::{AdminContext, Booking, Event, SeatSummary};
use crate::services::ServiceError;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

const ADMIN_EVENTS_PATH: &str = "/admin/events";

/// Full event as administrators see it, with the shareable link when private.
#[derive(Serialize)]
pub struct AdminEvent {
    #[serde(flatten)]
    pub event: Event,
    pub private_url: Option<String>,
}

impl AdminEvent {
    fn new(event: Event, config: &Config) -> Self {
        let private_url = event
            .access_token
            .as_deref()
            .filter(|_| event.is_private)
            .map(|token| config.private_url(token));
        Self { event, private_url }
    }
}

#[derive(Serialize)]
pub struct AdminEventDetail {
    pub event: AdminEvent,
    #[serde(flatten)]
    pub seats: SeatSummary,
    pub bookings: Vec<Booking>,
}

pub async fn index(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> Result<Response, AppError> {
    let events: Vec<AdminEvent> = state
        .gate()
        .list_for_admin(&admin)
        .await?
        .into_iter()
        .map(|event| AdminEvent::new(event, &state.config))
        .collect();

    Ok(success(events, "Events retrieved successfully").into_response())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = FormFields::from_multipart(multipart).await?;
    let input = form.event_input()?;
    let cover = form.take_file("cover");

    let event = state.catalog().create(&admin, input, cover).await?;
    Ok(created(AdminEvent::new(event, &state.config), "Event created successfully").into_response())
}

pub async fn show(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.gate().get_for_admin(&admin, id).await?;
    let desk = state.booking_desk();
    let seats = desk.seats(&event).await?;
    let bookings = desk.list(&admin, &event).await?;

    let detail = AdminEventDetail {
        event: AdminEvent::new(event, &state.config),
        seats,
        bookings,
    };
    Ok(success(detail, "Event retrieved successfully").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = FormFields::from_multipart(multipart).await?;
    let input = form.event_input()?;
    let cover = form.take_file("cover");

    let event = state.catalog().update(&admin, id, input, cover).await?;
    Ok(success(AdminEvent::new(event, &state.config), "Event updated successfully").into_response())
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.catalog().delete(&admin, id).await?;
    Ok(empty_success("Event deleted successfully").into_response())
}

/// Flips public/private and sends the browser back where it came from.
/// Failures are logged and the event is left as it was.
pub async fn toggle_privacy(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Redirect {
    let outcome = match Uuid::parse_str(&id) {
        Ok(id) => state
            .access_tokens()
            .toggle_privacy(&admin, id)
            .await
            .map_err(AppError::from),
        Err(_) => Err(AppError::from(ServiceError::event_not_found())),
    };
    if let Err(e) = outcome {
        warn!(admin = %admin.name, error = %e, "Privacy toggle failed");
    }

    Redirect::to(&back_path(&headers))
}

pub async fn regenerate_token(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.access_tokens().regenerate_token(&admin, id).await?;
    Ok(success(
        AdminEvent::new(event, &state.config),
        "Access token regenerated successfully",
    )
    .into_response())
}

/// Path component of the `Referer` when it points back into this site.
fn back_path(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(local_path)
        .unwrap_or_else(|| ADMIN_EVENTS_PATH.to_string())
}

fn local_path(referer: &str) -> Option<String> {
    let path = match referer.parse::<axum::http::Uri>() {
        Ok(uri) if uri.scheme().is_some() => uri.path_and_query()?.as_str().to_string(),
        Ok(_) => referer.to_string(),
        Err(_) => return None,
    };
    // `//host` would be read as another origin.
    (path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::sample_content;
    use chrono::Utc;

    #[test]
    fn back_path_keeps_local_paths_only() {
        assert_eq!(local_path("/admin/events/1"), Some("/admin/events/1".to_string()));
        assert_eq!(
            local_path("https://portal.example/admin/events?page=2"),
            Some("/admin/events?page=2".to_string())
        );
        assert_eq!(local_path("//evil.example/x"), None);
        assert_eq!(local_path("not a uri"), None);
    }

    #[test]
    fn missing_referer_goes_to_index() {
        assert_eq!(back_path(&HeaderMap::new()), ADMIN_EVENTS_PATH);
    }

    #[test]
    fn private_url_only_for_private_events() {
        let content = sample_content("Gala", Utc::now());
        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4(),
            name: content.name,
            description: content.description,
            date: content.date,
            capacity: content.capacity,
            location: content.location,
            cover: None,
            is_private: true,
            access_token: Some("abc".to_string()),
            created_at: now,
            updated_at: now,
        };
        let config = Config::default();
        assert_eq!(
            AdminEvent::new(event.clone(), &config).private_url.as_deref(),
            Some("http://localhost:3001/private/abc")
        );

        event.is_private = false;
        event.access_token = None;
        assert!(AdminEvent::new(event, &config).private_url.is_none());
    }
}
