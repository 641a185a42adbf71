use axum::{
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::ApiError;

/// Unknown `/api/*` paths get a JSON 404; everything else goes home
pub async fn fallback(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        tracing::debug!("No API route for {}", path);
        return ApiError::not_found(format!("Endpoint {} not found", path)).into_response();
    }

    Redirect::temporary("/").into_response()
}
