//! Bearer-token validation against the external auth service.
//!
//! The service exposes `POST /v1/token/validate` taking `{"token": "..."}`
//! and answering `{"valid": bool, "details": {"userId", "expiresAt"}}` on
//! success or `{"error", "details"}` on 4xx/5xx.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use crate::config::AuthConfig;

/// Identity established by a validated token
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedToken {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("authentication service URL is not configured")]
    NotConfigured,

    #[error("invalid authentication service URL: {0}")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The token itself is bad; answered with 401
    #[error("{message}: {details}")]
    Rejected { message: String, details: String },

    /// The auth service failed or misbehaved; answered with 502
    #[error("{message}: {details}")]
    Unavailable { message: String, details: String },
}

impl AuthError {
    fn rejected(message: impl Into<String>, details: impl Into<String>) -> Self {
        AuthError::Rejected {
            message: message.into(),
            details: details.into(),
        }
    }

    fn unavailable(message: impl Into<String>, details: impl Into<String>) -> Self {
        AuthError::Unavailable {
            message: message.into(),
            details: details.into(),
        }
    }
}

#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<ValidatedToken, AuthError>;
}

/// HTTP client for the auth service
#[derive(Clone)]
pub struct AuthServiceClient {
    http: reqwest::Client,
    validate_url: Option<String>,
}

impl AuthServiceClient {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuthError::Client(e.to_string()))?;

        let validate_url = match config.service_url.as_deref() {
            Some(base) => Some(validate_endpoint(base)?),
            None => None,
        };

        Ok(Self { http, validate_url })
    }

    pub fn validate_url(&self) -> Option<&str> {
        self.validate_url.as_deref()
    }
}

/// `{base}/v1/token/validate`, keeping any path prefix on the base
fn validate_endpoint(base: &str) -> Result<String, AuthError> {
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))
        .map_err(|e| AuthError::InvalidUrl(format!("{}: {}", base, e)))?;
    let endpoint = base
        .join("v1/token/validate")
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
    Ok(endpoint.to_string())
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: Option<String>,
    details: Option<String>,
}

#[async_trait]
impl TokenValidator for AuthServiceClient {
    async fn validate(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        let url = match &self.validate_url {
            Some(url) => url,
            None => {
                tracing::error!("AUTH_SERVICE_URL environment variable is not configured");
                return Err(AuthError::NotConfigured);
            }
        };

        tracing::debug!("Validating token {} at {}", fingerprint(token), url);

        let response = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token validation request failed: {}", e);
                AuthError::unavailable("Token validation failed", e.to_string())
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!("Auth service responded {} ({})", status, content_type);

        match status {
            StatusCode::OK => {
                let body: serde_json::Value = response.json().await.map_err(|e| {
                    AuthError::unavailable("Invalid response format", format!("Auth service response is not JSON: {}", e))
                })?;
                parse_validation_body(&body, Utc::now())
            }
            StatusCode::BAD_REQUEST => {
                let err = read_service_error(response).await;
                tracing::warn!("Auth service rejected request: {:?}", err.error);
                Err(AuthError::rejected(
                    err.error.unwrap_or_else(|| "Invalid request".to_string()),
                    err.details.unwrap_or_else(|| "Access token is required.".to_string()),
                ))
            }
            StatusCode::UNAUTHORIZED => {
                let err = read_service_error(response).await;
                tracing::warn!("Token {} rejected: {:?}", fingerprint(token), err.error);
                Err(AuthError::rejected(
                    err.error.unwrap_or_else(|| "Invalid access token".to_string()),
                    err.details
                        .unwrap_or_else(|| "The provided access token is not valid or has expired.".to_string()),
                ))
            }
            StatusCode::INTERNAL_SERVER_ERROR => {
                let err = read_service_error(response).await;
                tracing::error!("Auth service internal error: {:?}", err.error);
                Err(AuthError::unavailable(
                    err.error.unwrap_or_else(|| "Internal server error".to_string()),
                    err.details.unwrap_or_else(|| "An unexpected error occurred.".to_string()),
                ))
            }
            other => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Could not read response body".to_string());
                tracing::error!("Unexpected auth service response {}: {}", other, body);
                Err(AuthError::unavailable(
                    "Unexpected response from auth service",
                    format!("Received status {} with content type {}", other.as_u16(), content_type),
                ))
            }
        }
    }
}

async fn read_service_error(response: reqwest::Response) -> ServiceError {
    response.json::<ServiceError>().await.unwrap_or(ServiceError {
        error: None,
        details: None,
    })
}

/// Interpret a 200 body from the validate endpoint
pub fn parse_validation_body(body: &serde_json::Value, now: DateTime<Utc>) -> Result<ValidatedToken, AuthError> {
    let malformed = || {
        tracing::error!("Invalid auth service response structure: {}", body);
        AuthError::unavailable(
            "Invalid response format",
            "Auth service response does not match expected format",
        )
    };

    let valid = body.get("valid").and_then(|v| v.as_bool()).ok_or_else(malformed)?;

    if !valid {
        let message = body
            .pointer("/error/message")
            .or_else(|| body.get("error"))
            .and_then(|v| v.as_str())
            .unwrap_or("Invalid access token");
        let details = body
            .pointer("/error/details")
            .or_else(|| body.get("details"))
            .and_then(|v| v.as_str())
            .unwrap_or("The provided access token is not valid or has expired.");
        return Err(AuthError::rejected(message, details));
    }

    let user_id = body
        .pointer("/details/userId")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(malformed)?;
    let expires_at = body
        .pointer("/details/expiresAt")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(malformed)?;

    if expires_at <= now {
        return Err(AuthError::rejected(
            "Invalid access token",
            "The provided access token is not valid or has expired.",
        ));
    }

    Ok(ValidatedToken {
        user_id: user_id.to_string(),
        expires_at,
    })
}

/// Short, non-reversible token identifier for logs
pub fn fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn accepts_valid_body() {
        let body = json!({
            "valid": true,
            "details": { "userId": "user-7", "expiresAt": "2026-01-01T01:00:00Z" }
        });
        let token = parse_validation_body(&body, now()).unwrap();
        assert_eq!(token.user_id, "user-7");
        assert_eq!(token.expires_at, now() + ChronoDuration::hours(1));
    }

    #[test]
    fn invalid_flag_is_a_rejection() {
        let body = json!({ "valid": false, "error": { "message": "Token revoked", "details": "revoked at logout" } });
        match parse_validation_body(&body, now()) {
            Err(AuthError::Rejected { message, details }) => {
                assert_eq!(message, "Token revoked");
                assert_eq!(details, "revoked at logout");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn malformed_bodies_are_service_failures() {
        for body in [
            json!({}),
            json!({ "valid": "yes" }),
            json!({ "valid": true }),
            json!({ "valid": true, "details": { "userId": "u" } }),
            json!({ "valid": true, "details": { "userId": "u", "expiresAt": "tomorrow" } }),
        ] {
            assert!(
                matches!(parse_validation_body(&body, now()), Err(AuthError::Unavailable { .. })),
                "{}",
                body
            );
        }
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let body = json!({
            "valid": true,
            "details": { "userId": "user-7", "expiresAt": "2025-12-31T23:59:59Z" }
        });
        assert!(matches!(parse_validation_body(&body, now()), Err(AuthError::Rejected { .. })));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        assert_eq!(fingerprint("abc"), fingerprint("abc"));
        assert_ne!(fingerprint("abc"), fingerprint("abd"));
        assert_eq!(fingerprint("abc").len(), 12);
    }

    #[test]
    fn builds_validate_url_from_base() {
        let mut config = crate::config::AppConfig::development().auth;
        assert!(AuthServiceClient::new(&config).unwrap().validate_url().is_none());

        config.service_url = Some("https://auth.example.com/".into());
        let client = AuthServiceClient::new(&config).unwrap();
        assert_eq!(client.validate_url(), Some("https://auth.example.com/v1/token/validate"));

        config.service_url = Some("http://gateway.local/auth".into());
        let client = AuthServiceClient::new(&config).unwrap();
        assert_eq!(client.validate_url(), Some("http://gateway.local/auth/v1/token/validate"));

        config.service_url = Some("not a url".into());
        assert!(matches!(AuthServiceClient::new(&config), Err(AuthError::InvalidUrl(_))));
    }
}
