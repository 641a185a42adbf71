//! `AuthServiceClient` against a stub auth service bound to a local port.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use contacts_api::auth::{AuthError, AuthServiceClient, TokenValidator};
use contacts_api::config::AuthConfig;

/// Serve `POST /v1/token/validate`, answering by token value
async fn spawn_stub() -> String {
    async fn validate(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let expires = (Utc::now() + Duration::hours(1)).to_rfc3339();
        match body["token"].as_str().unwrap_or_default() {
            "good" => (
                StatusCode::OK,
                Json(json!({ "valid": true, "details": { "userId": "user-42", "expiresAt": expires } })),
            ),
            "revoked" => (StatusCode::OK, Json(json!({ "valid": false }))),
            "garbled" => (StatusCode::OK, Json(json!({ "ok": "maybe" }))),
            "expired" => (
                StatusCode::OK,
                Json(json!({
                    "valid": true,
                    "details": { "userId": "user-42", "expiresAt": (Utc::now() - Duration::hours(1)).to_rfc3339() }
                })),
            ),
            "bad-request" => (StatusCode::BAD_REQUEST, Json(json!({}))),
            "unauthorized" => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Token expired", "details": "Session ended" })),
            ),
            "boom" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
            _ => (StatusCode::IM_A_TEAPOT, Json(json!({}))),
        }
    }

    let app = Router::new().route("/v1/token/validate", post(validate));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn client(base: Option<String>) -> AuthServiceClient {
    AuthServiceClient::new(&AuthConfig {
        service_url: base,
        request_timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn valid_token_yields_user() {
    let client = client(Some(spawn_stub().await));
    let token = client.validate("good").await.unwrap();
    assert_eq!(token.user_id, "user-42");
    assert!(token.expires_at > Utc::now());
}

#[tokio::test]
async fn status_codes_map_to_outcomes() {
    let client = client(Some(spawn_stub().await));

    match client.validate("bad-request").await {
        Err(AuthError::Rejected { message, details }) => {
            assert_eq!(message, "Invalid request");
            assert_eq!(details, "Access token is required.");
        }
        other => panic!("unexpected: {:?}", other),
    }

    match client.validate("unauthorized").await {
        Err(AuthError::Rejected { message, details }) => {
            assert_eq!(message, "Token expired");
            assert_eq!(details, "Session ended");
        }
        other => panic!("unexpected: {:?}", other),
    }

    match client.validate("boom").await {
        Err(AuthError::Unavailable { message, details }) => {
            assert_eq!(message, "Internal server error");
            assert_eq!(details, "An unexpected error occurred.");
        }
        other => panic!("unexpected: {:?}", other),
    }

    match client.validate("teapot").await {
        Err(AuthError::Unavailable { message, .. }) => assert_eq!(message, "Unexpected response from auth service"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn bad_success_bodies() {
    let client = client(Some(spawn_stub().await));
    assert!(matches!(client.validate("revoked").await, Err(AuthError::Rejected { .. })));
    assert!(matches!(client.validate("expired").await, Err(AuthError::Rejected { .. })));
    assert!(matches!(client.validate("garbled").await, Err(AuthError::Unavailable { .. })));
}

#[tokio::test]
async fn unreachable_and_unconfigured_service() {
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client_down = client(Some(format!("http://{}", addr)));
    match client_down.validate("good").await {
        Err(AuthError::Unavailable { message, .. }) => assert_eq!(message, "Token validation failed"),
        other => panic!("unexpected: {:?}", other),
    }

    assert!(matches!(client(None).validate("good").await, Err(AuthError::NotConfigured)));
}
