use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Extension;
use serde::Serialize;

use crate::app::AppState;
use crate::contact::ContactView;
use crate::error::ApiError;
use crate::filter::{ContactQuery, ListParams};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ContactList {
    pub contacts: Vec<ContactView>,
    pub pagination: Pagination,
}

/// GET /api/contacts - the caller's contacts, filtered, sorted and paged
pub async fn contact_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<ContactList> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e.body_text())))?;
    let query = ContactQuery::from_params(params, &state.config.api)?;

    let page = state.store.list(&user.user_id, &query).await?;

    tracing::debug!(
        "Listed {} of {} contacts for user {}",
        page.contacts.len(),
        page.total,
        user.user_id
    );

    Ok(ApiResponse::success(ContactList {
        pagination: Pagination {
            page: query.page,
            page_size: query.page_size,
            total: page.total,
            total_pages: query.total_pages(page.total),
        },
        contacts: page.contacts.into_iter().map(ContactView::from).collect(),
    }))
}
