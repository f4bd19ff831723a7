//! v1 report handlers.

use axum::extract::State;
use axum::Extension;

use crate::api::v1::middleware::SessionContext;
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::models::{TopFavoritedItem, TopPurchaser, TopSellingItem};

/// `GET /api/v1/reports/top-favorited`
#[utoipa::path(
    get,
    path = "/api/v1/reports/top-favorited",
    tag = "reports",
    operation_id = "reports.topFavorited",
    responses(
        (status = 200, description = "The five most favorited items", body = Vec<TopFavoritedItem>),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn top_favorited(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<Vec<TopFavoritedItem>> {
    match state.reports.top_favorited(&session.access_token).await {
        Ok(groups) => ApiResponse::success(groups),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/reports/top-selling`
#[utoipa::path(
    get,
    path = "/api/v1/reports/top-selling",
    tag = "reports",
    operation_id = "reports.topSelling",
    responses(
        (status = 200, description = "The five most purchased items", body = Vec<TopSellingItem>),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn top_selling(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<Vec<TopSellingItem>> {
    match state.reports.top_selling(&session.access_token).await {
        Ok(groups) => ApiResponse::success(groups),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/reports/top-purchasers`
#[utoipa::path(
    get,
    path = "/api/v1/reports/top-purchasers",
    tag = "reports",
    operation_id = "reports.topPurchasers",
    responses(
        (status = 200, description = "The five most active buyers with their latest purchase", body = Vec<TopPurchaser>),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn top_purchasers(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<Vec<TopPurchaser>> {
    match state.reports.top_purchasers(&session.access_token).await {
        Ok(groups) => ApiResponse::success(groups),
        Err(e) => e.into(),
    }
}
