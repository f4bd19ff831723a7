//! v1 favorite handlers.

use axum::extract::{Path, State};
use axum::Extension;
use axum_extra::extract::Query;

use crate::api::extractors::ValidatedJson;
use crate::api::v1::dto::{
    CreateFavoriteRequest, DeletedResponse, OrderQuery, UpdateFavoriteRequest,
};
use crate::api::v1::middleware::{ensure_owner_or_admin, SessionContext};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::{Result, VitrinaError};
use crate::models::{EnrichedRecord, FavoriteRecord, SortOrder, SourceRecord};

async fn load_favorite(state: &AppState, id: &str) -> Result<FavoriteRecord> {
    state
        .db
        .get_favorite(id)
        .await?
        .ok_or_else(|| VitrinaError::NotFound(format!("Favorite {id} not found")))
}

/// `POST /api/v1/favorites`
///
/// The item is looked up first; unknown items are rejected before anything is
/// stored.
#[utoipa::path(
    post,
    path = "/api/v1/favorites",
    tag = "favorites",
    operation_id = "favorites.create",
    request_body = CreateFavoriteRequest,
    responses(
        (status = 201, description = "Favorite created", body = FavoriteRecord),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Item not found in the marketplace", body = ApiError),
        (status = 409, description = "Item already favorited by this user", body = ApiError),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn create_favorite(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ValidatedJson(req): ValidatedJson<CreateFavoriteRequest>,
) -> ApiResponse<FavoriteRecord> {
    let mut favorite = FavoriteRecord::new(session.user_id.clone(), req.item_id);
    favorite.rating = req.rating;
    favorite.comment = req.comment;

    let result = async {
        state
            .hydration
            .hydrate_one(
                SourceRecord::Item(favorite.item_id.clone()),
                &session.access_token,
            )
            .await?;
        state.db.create_favorite(&favorite).await
    }
    .await;

    match result {
        Ok(()) => ApiResponse::created(favorite),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/favorites/{favoriteId}`
#[utoipa::path(
    get,
    path = "/api/v1/favorites/{favoriteId}",
    tag = "favorites",
    operation_id = "favorites.get",
    params(("favoriteId" = String, Path, description = "Favorite ID")),
    responses(
        (status = 200, description = "Favorite found", body = FavoriteRecord),
        (status = 404, description = "Favorite not found", body = ApiError),
    )
)]
pub async fn get_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<FavoriteRecord> {
    match load_favorite(&state, &id).await {
        Ok(favorite) => ApiResponse::success(favorite),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/favorites/user/{userId}`
///
/// The user's favorites joined with live product data, oldest first unless
/// `order=desc`.
#[utoipa::path(
    get,
    path = "/api/v1/favorites/user/{userId}",
    tag = "favorites",
    operation_id = "favorites.listByUser",
    params(("userId" = String, Path, description = "User ID"), OrderQuery),
    responses(
        (status = 200, description = "Hydrated favorites", body = Vec<EnrichedRecord>),
        (status = 400, description = "Invalid order", body = ApiError),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn list_user_favorites(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(user_id): Path<String>,
    Query(query): Query<OrderQuery>,
) -> ApiResponse<Vec<EnrichedRecord>> {
    let order = match query.sort_order(SortOrder::Ascending) {
        Ok(order) => order,
        Err(msg) => return ApiResponse::error(ErrorCode::InvalidRequest, msg),
    };

    let favorites = match state.db.list_favorites_by_user(&user_id, order).await {
        Ok(favorites) => favorites,
        Err(e) => return e.into(),
    };

    let records = favorites.into_iter().map(SourceRecord::from).collect();
    match state
        .hydration
        .hydrate_many(records, &session.access_token)
        .await
    {
        Ok(enriched) => ApiResponse::success(enriched),
        Err(e) => e.into(),
    }
}

/// `PATCH /api/v1/favorites/{favoriteId}`
#[utoipa::path(
    patch,
    path = "/api/v1/favorites/{favoriteId}",
    tag = "favorites",
    operation_id = "favorites.update",
    params(("favoriteId" = String, Path, description = "Favorite ID")),
    request_body = UpdateFavoriteRequest,
    responses(
        (status = 200, description = "Favorite updated", body = FavoriteRecord),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Favorite not found", body = ApiError),
    )
)]
pub async fn update_favorite(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFavoriteRequest>,
) -> ApiResponse<FavoriteRecord> {
    let result = async {
        let existing = load_favorite(&state, &id).await?;
        ensure_owner_or_admin(&state, &session, &existing.user_id).await?;
        state
            .db
            .update_favorite(&id, &req.into())
            .await?
            .ok_or_else(|| VitrinaError::NotFound(format!("Favorite {id} not found")))
    }
    .await;

    match result {
        Ok(favorite) => ApiResponse::success(favorite),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/favorites/{favoriteId}`
#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{favoriteId}",
    tag = "favorites",
    operation_id = "favorites.delete",
    params(("favoriteId" = String, Path, description = "Favorite ID")),
    responses(
        (status = 200, description = "Favorite deleted", body = DeletedResponse),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Favorite not found", body = ApiError),
    )
)]
pub async fn delete_favorite(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResponse<DeletedResponse> {
    let result = async {
        let existing = load_favorite(&state, &id).await?;
        ensure_owner_or_admin(&state, &session, &existing.user_id).await?;
        state.db.delete_favorite(&id).await
    }
    .await;

    match result {
        Ok(true) => ApiResponse::success(DeletedResponse::new(id)),
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, format!("Favorite {id} not found")),
        Err(e) => e.into(),
    }
}
