use axum::extract::{rejection::JsonRejection, State};
use axum::{Extension, Json};
use serde_json::Value;

use super::json_body;
use crate::app::AppState;
use crate::contact::ContactView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/contacts - create a contact owned by the caller
pub async fn contact_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ContactView> {
    let body = json_body(body)?;

    let contact = state.pipeline.create(state.store.clone(), &user.user_id, body).await?;

    Ok(ApiResponse::created(ContactView::from(contact)))
}
