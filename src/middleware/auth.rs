use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::app::AppState;
use crate::auth::{fingerprint, ValidatedToken};
use crate::error::ApiError;

/// Authenticated caller, injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<ValidatedToken> for AuthUser {
    fn from(token: ValidatedToken) -> Self {
        Self {
            user_id: token.user_id,
            expires_at: token.expires_at,
        }
    }
}

/// Validates the bearer token with the auth service and extracts the caller
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let validated = state.validator.validate(&token).await.map_err(|e| {
        tracing::warn!("Token {} failed validation: {}", fingerprint(&token), e);
        ApiError::from(e)
    })?;

    tracing::debug!("Authenticated user {} via token {}", validated.user_id, fingerprint(&token));

    request.extensions_mut().insert(AuthUser::from(validated));

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
