//! v1 marketplace handlers: live search and item lookup, hydrated and
//! annotated with the caller's favorites.

use axum::extract::{Path, State};
use axum::Extension;
use axum_extra::extract::Query;
use validator::Validate;

use crate::api::v1::dto::SearchParams;
use crate::api::v1::middleware::SessionContext;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::{EnrichedRecord, SearchQuery};

/// `GET /api/v1/marketplace/search`
#[utoipa::path(
    get,
    path = "/api/v1/marketplace/search",
    tag = "marketplace",
    operation_id = "marketplace.search",
    params(SearchParams),
    responses(
        (status = 200, description = "Hydrated search results; paging in `meta`", body = Vec<EnrichedRecord>),
        (status = 400, description = "Invalid query", body = ApiError),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<SearchParams>,
) -> ApiResponse<Vec<EnrichedRecord>> {
    if let Err(e) = params.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let query = SearchQuery::from(params);
    match state
        .hydration
        .search(&query, &session.access_token, Some(&session.user_id))
        .await
    {
        Ok(found) => ApiResponse::success_with_meta(found.results, found.paging.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/marketplace/items/{itemId}`
#[utoipa::path(
    get,
    path = "/api/v1/marketplace/items/{itemId}",
    tag = "marketplace",
    operation_id = "marketplace.getItem",
    params(("itemId" = String, Path, description = "Marketplace item ID")),
    responses(
        (status = 200, description = "Hydrated item", body = EnrichedRecord),
        (status = 404, description = "Item not found", body = ApiError),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(item_id): Path<String>,
) -> ApiResponse<EnrichedRecord> {
    match state
        .hydration
        .hydrate_item(&item_id, &session.access_token, Some(&session.user_id))
        .await
    {
        Ok(record) => ApiResponse::success(record),
        Err(e) => e.into(),
    }
}
