use axum::extract::{Query, State};
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::contact::validation::is_valid_email;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct FindByEmailParams {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLookup {
    pub exists: bool,
    pub contact_id: Option<String>,
}

/// GET /api/contacts/find-by-email?email= - exact match on the primary email
pub async fn contact_find_by_email(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FindByEmailParams>,
) -> ApiResult<EmailLookup> {
    let email = params
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("Email parameter is required"))?;

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let contact_id = state.store.find_by_email(&user.user_id, &email).await?;

    Ok(ApiResponse::success(EmailLookup {
        exists: contact_id.is_some(),
        contact_id,
    }))
}
