//! Unauthenticated event pages, private links and bookings.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::{Event, EventPage, EventView, Locale, NewBooking, ProjectView};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn list_events(
    State(state): State<AppState>,
    locale: Locale,
) -> Result<Response, AppError> {
    let events = state.gate().list_public().await?;
    let views: Vec<EventView> = events
        .iter()
        .map(|event| EventView::new(event, &locale))
        .collect();

    Ok(success(views, "Events retrieved successfully").into_response())
}

pub async fn show_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    locale: Locale,
) -> Result<Response, AppError> {
    let event = state.gate().get_by_id_for_public(&id).await?;
    render_page(&state, &event, &locale, false).await
}

pub async fn book_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<NewBooking>,
) -> Result<Response, AppError> {
    let event = state.gate().get_by_id_for_public(&id).await?;
    let booking = state.booking_desk().book(&event, request).await?;
    Ok(created(booking, "Booking confirmed").into_response())
}

pub async fn show_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    locale: Locale,
) -> Result<Response, AppError> {
    let event = state.gate().get_by_token(&token).await?;
    render_page(&state, &event, &locale, true).await
}

pub async fn book_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<NewBooking>,
) -> Result<Response, AppError> {
    let event = state.gate().get_by_token(&token).await?;
    let booking = state.booking_desk().book(&event, request).await?;
    Ok(created(booking, "Booking confirmed").into_response())
}

pub async fn list_projects(
    State(state): State<AppState>,
    locale: Locale,
) -> Result<Response, AppError> {
    let projects = state.project_catalog().list().await?;
    let views: Vec<ProjectView> = projects
        .iter()
        .map(|project| ProjectView::new(project, &locale))
        .collect();

    Ok(success(views, "Projects retrieved successfully").into_response())
}

async fn render_page(
    state: &AppState,
    event: &Event,
    locale: &Locale,
    private_event: bool,
) -> Result<Response, AppError> {
    let seats = state.booking_desk().seats(event).await?;
    let page = EventPage {
        event: EventView::new(event, locale).with_seats(seats),
        private_event,
    };
    Ok(success(page, "Event retrieved successfully").into_response())
}
