pub mod create;
pub mod find_by_email;
pub mod list;
pub mod record;

pub use create::contact_create;
pub use find_by_email::contact_find_by_email;
pub use list::contact_list;
pub use record::{contact_delete, contact_get, contact_patch};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, reporting unparseable input as `INVALID_JSON`
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::bad_request("Request body exceeds the maximum allowed size"))
        }
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::invalid_json(format!("Invalid JSON body: {}", rejection.body_text())))
        }
    }
}
