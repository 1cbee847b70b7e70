use axum::body::Body;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::Request;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, HeaderProfile, SecurityHeadersLayer};
use crate::handlers::{admin, health_check, projects, public};
use crate::middleware::require_admin;
use crate::state::AppState;

/// Upload ceiling for event covers and project images.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let include_hsts = state.config.production;

    let public_routes = Router::new()
        .route("/events", get(public::list_events))
        .route("/events/:id", get(public::show_event))
        .route("/events/:id/bookings", post(public::book_event))
        .route("/projects", get(public::list_projects));

    let private_routes = Router::new()
        .route("/private/:token", get(public::show_by_token))
        .route("/private/:token/bookings", post(public::book_by_token))
        .layer(SecurityHeadersLayer::new(HeaderProfile::PrivateLink, include_hsts));

    let admin_routes = Router::new()
        .route("/admin/events", get(admin::index).post(admin::create))
        .route(
            "/admin/events/:id",
            get(admin::show).put(admin::update).delete(admin::destroy),
        )
        .route("/admin/events/:id/privacy", post(admin::toggle_privacy))
        .route("/admin/events/:id/token", post(admin::regenerate_token))
        .route("/admin/projects", get(projects::index).post(projects::create))
        .route(
            "/admin/projects/:id",
            put(projects::update).delete(projects::destroy),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(SecurityHeadersLayer::new(HeaderProfile::Admin, include_hsts));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(private_routes)
        .merge(admin_routes)
        .nest_service("/storage", ServeDir::new(&state.config.storage_root))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Spans name the route pattern; raw paths would put private tokens in the logs.
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let route = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str)
                .unwrap_or("unmatched");
            tracing::info_span!("http_request", method = %request.method(), route)
        }))
        .layer(SecurityHeadersLayer::new(HeaderProfile::Standard, include_hsts))
        .layer(create_cors_layer(&state.config.cors_allowed_origins))
        .with_state(state)
}
