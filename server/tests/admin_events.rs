mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use uuid::Uuid;

use common::{MultipartBody, TestApp, ADMIN_TOKEN};
use portal_server::models::{Access, Event};
use portal_server::routes::create_routes;
use portal_server::store::{EventStore, EventUpdate, MemoryStore, NewEvent, StoreError};
use portal_server::AppState;

const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

fn toggle_request(id: impl std::fmt::Display, referer: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(format!("/admin/events/{id}/privacy"))
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"));
    if let Some(referer) = referer {
        builder = builder.header(header::REFERER, referer);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn admin_routes_require_a_valid_bearer_token() {
    let app = TestApp::spawn().await;

    let anonymous = app.get("/admin/events").await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json()["error"]["code"], "AUTH_ERROR");

    let wrong = app
        .send(
            Request::get("/admin/events")
                .header(header::AUTHORIZATION, "Bearer not-the-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let ok = app.admin_get("/admin/events").await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.header("cache-control"), Some("no-store"));
}

#[tokio::test]
async fn toggling_privacy_issues_and_clears_tokens() {
    let app = TestApp::spawn().await;
    let event = app.seed_event("Open day", Access::public()).await;

    let response = app
        .send(toggle_request(event.id, Some("https://portal.test/admin/events/42?tab=info")))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), Some("/admin/events/42?tab=info"));

    let private = app.event(event.id).await.unwrap();
    assert!(private.is_private);
    let token = private.access_token.clone().unwrap();
    assert_eq!(app.get(&format!("/private/{token}")).await.status, StatusCode::OK);

    let response = app.send(toggle_request(event.id, None)).await;
    assert_eq!(response.header("location"), Some("/admin/events"));

    let public = app.event(event.id).await.unwrap();
    assert!(!public.is_private);
    assert_eq!(public.access_token, None);
    assert_eq!(app.get(&format!("/private/{token}")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn toggling_an_unknown_event_still_redirects() {
    let app = TestApp::spawn().await;

    let missing = app.send(toggle_request(Uuid::new_v4(), Some("/admin/events"))).await;
    assert_eq!(missing.status, StatusCode::SEE_OTHER);

    let malformed = app.send(toggle_request("nope", Some("//evil.example/"))).await;
    assert_eq!(malformed.status, StatusCode::SEE_OTHER);
    assert_eq!(malformed.header("location"), Some("/admin/events"));
}

/// Reads from memory but refuses every access change.
struct FrozenAccess(Arc<MemoryStore>);

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl EventStore for FrozenAccess {
    async fn list_public(&self) -> Result<Vec<Event>, StoreError> {
        self.0.list_public().await
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        self.0.list_all().await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        self.0.find_by_id(id).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Event>, StoreError> {
        self.0.find_by_token(token).await
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, StoreError> {
        self.0.insert(event).await
    }

    async fn update(&self, _id: Uuid, _update: EventUpdate) -> Result<Option<Event>, StoreError> {
        Err(unavailable())
    }

    async fn set_access(&self, _id: Uuid, _access: Access) -> Result<Option<Event>, StoreError> {
        Err(unavailable())
    }

    async fn rotate_token(&self, _id: Uuid, _token: String) -> Result<Option<Event>, StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        self.0.delete(id).await
    }
}

#[tokio::test]
async fn failed_toggle_leaves_the_event_untouched() {
    let app = TestApp::spawn().await;
    let event = app.seed_event("Open day", Access::public()).await;

    let state = AppState {
        events: Arc::new(FrozenAccess(app.store.clone())),
        ..app.state.clone()
    };
    let response = {
        use tower::ServiceExt;
        create_routes(state)
            .oneshot(toggle_request(event.id, Some("/admin/events")))
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let unchanged = app.event(event.id).await.unwrap();
    assert_eq!(unchanged, event);
}

#[tokio::test]
async fn create_show_and_delete_an_event() {
    let app = TestApp::spawn().await;

    let form = MultipartBody::new()
        .text("name[en]", "Launch party")
        .text("name[ar]", "حفل الإطلاق")
        .text("description[en]", "Celebrating the release")
        .text("date", "2031-09-12T20:00")
        .text("capacity", "50")
        .text("location", "Studio B")
        .text("is_private", "1")
        .file("cover", "Cover Photo.JPG", "image/jpeg", JPEG)
        .finish();
    let created = app.admin_multipart("POST", "/admin/events", form).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.text());

    let data = created.json()["data"].clone();
    let id = data["id"].as_str().unwrap().to_string();
    let token = data["access_token"].as_str().unwrap().to_string();
    assert_eq!(data["is_private"], true);
    assert_eq!(data["private_url"], format!("https://portal.test/private/{token}"));

    let cover = data["cover"].as_str().unwrap().to_string();
    assert!(cover.starts_with("images/events/"));
    assert!(cover.ends_with("-cover-photo.jpg"));
    assert!(app.storage.path().join(&cover).exists());

    let detail = app.admin_get(&format!("/admin/events/{id}")).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.json()["data"]["remaining_seats"], 50);
    assert_eq!(detail.json()["data"]["bookings"], serde_json::json!([]));

    let served = app.get(&format!("/storage/{cover}")).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.body, JPEG);

    let deleted = app
        .send(
            Request::delete(format!("/admin/events/{id}"))
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!app.storage.path().join(&cover).exists());
    assert_eq!(app.get(&format!("/private/{token}")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_without_cover_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let form = MultipartBody::new()
        .text("name[en]", "Launch party")
        .text("description[en]", "Celebrating the release")
        .text("date", "2031-09-12")
        .text("capacity", "50")
        .text("location", "Studio B")
        .finish();
    let response = app.admin_multipart("POST", "/admin/events", form).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["error"]["message"], "The cover field is required.");
}

#[tokio::test]
async fn update_switching_to_public_drops_the_token() {
    let app = TestApp::spawn().await;
    let event = app
        .seed_event("Board dinner", Access::private("feedface".repeat(8)))
        .await;

    let form = MultipartBody::new()
        .text("name[en]", "Board dinner")
        .text("description[en]", "Now open to all")
        .text("date", "2031-06-01T19:00:00Z")
        .text("capacity", "12")
        .text("location", "Rooftop")
        .text("is_private", "0")
        .finish();
    let response = app
        .admin_multipart("PUT", &format!("/admin/events/{}", event.id), form)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());

    let stored = app.event(event.id).await.unwrap();
    assert!(!stored.is_private);
    assert_eq!(stored.access_token, None);
    assert_eq!(stored.capacity, 12);
    assert_eq!(app.get(&format!("/events/{}", event.id)).await.status, StatusCode::OK);
}
