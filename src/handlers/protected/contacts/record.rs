use axum::extract::{rejection::JsonRejection, Path, State};
use axum::{Extension, Json};
use serde_json::Value;

use super::json_body;
use crate::app::AppState;
use crate::contact::ContactView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/contacts/:id
pub async fn contact_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ContactView> {
    let contact = state.pipeline.select(state.store.clone(), &user.user_id, &id).await?;
    Ok(ApiResponse::success(contact.into()))
}

/// PATCH /api/contacts/:id - update only the supplied fields
pub async fn contact_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ContactView> {
    let body = json_body(body)?;

    let contact = state.pipeline.update(state.store.clone(), &user.user_id, &id, body).await?;
    Ok(ApiResponse::success(contact.into()))
}

/// DELETE /api/contacts/:id - responds with the removed contact
pub async fn contact_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ContactView> {
    let contact = state.pipeline.delete(state.store.clone(), &user.user_id, &id).await?;
    Ok(ApiResponse::success(contact.into()))
}
