#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use contacts_api::config::AppConfig;
use contacts_api::testing::{MemoryContactStore, StaticTokenValidator};
use contacts_api::{router, AppState};

pub const ALICE: &str = "token-alice";
pub const BOB: &str = "token-bob";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryContactStore>,
}

/// Router over an in-memory store with two known users
pub fn build_test_app() -> TestApp {
    build_test_app_with(known_users())
}

pub fn known_users() -> StaticTokenValidator {
    StaticTokenValidator::new()
        .with_user(ALICE, "user-alice")
        .with_user(BOB, "user-bob")
}

pub fn build_test_app_with(validator: StaticTokenValidator) -> TestApp {
    build_test_app_with_config(validator, AppConfig::development())
}

pub fn build_test_app_with_config(validator: StaticTokenValidator, config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryContactStore::new());
    let state = AppState::new(store.clone(), Arc::new(validator), config);
    TestApp {
        router: router(state),
        store,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn send_raw(&self, method: Method, uri: &str, token: &str, raw: &'static str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Create a contact and return its `data` object
    pub async fn create(&self, token: &str, body: Value) -> Value {
        let response = self.send(Method::POST, "/api/contacts", Some(token), Some(body)).await;
        assert_eq!(response.status(), 201);
        body_json(response).await["data"].clone()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A minimal valid create payload
pub fn contact_body(first: &str, last: &str, email: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": last,
        "email": { "primary": email },
        "phones": [{ "type": "mobile", "number": "+1-555-123-4567", "primary": true }]
    })
}
