#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use portal_server::config::{parse_admin_credentials, Config};
use portal_server::models::{Access, Event, EventContent};
use portal_server::routes::create_routes;
use portal_server::services::LocalMediaStorage;
use portal_server::store::{EventStore, MemoryStore, NewEvent};
use portal_server::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const MULTIPART_BOUNDARY: &str = "portal-test-boundary";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub storage: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(
            LocalMediaStorage::new(storage.path())
                .await
                .expect("media storage"),
        );
        let config = Config {
            storage_root: storage.path().to_path_buf(),
            public_base_url: "https://portal.test".to_string(),
            admin_credentials: parse_admin_credentials(&format!("tester:{ADMIN_TOKEN}")),
            ..Config::default()
        };

        Self {
            state: AppState::new(config, store.clone(), media),
            store,
            storage,
        }
    }

    pub fn router(&self) -> Router {
        create_routes(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.expect("request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn admin_get(&self, uri: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn admin_post(&self, uri: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn admin_multipart(&self, method: &str, uri: &str, body: Vec<u8>) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn seed_event(&self, name: &str, access: Access) -> Event {
        self.store
            .insert(NewEvent {
                content: content(name),
                cover: None,
                access,
            })
            .await
            .expect("seed event")
    }

    pub async fn event(&self, id: uuid::Uuid) -> Option<Event> {
        self.store.find_by_id(id).await.expect("find event")
    }
}

pub fn content(name: &str) -> EventContent {
    EventContent {
        name: [("en", name), ("fr", "Soirée")].into_iter().collect(),
        description: [("en", "Drinks and music")].into_iter().collect(),
        date: Utc.with_ymd_and_hms(2031, 6, 1, 19, 0, 0).unwrap(),
        capacity: 10,
        location: "Rooftop".to_string(),
    }
}

/// Minimal `multipart/form-data` encoder for text fields and one optional file.
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}
