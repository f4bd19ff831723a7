//! v1 purchase handlers. Every read returns purchases joined with live
//! product data and the caller's favorite annotation.

use axum::extract::{Path, State};
use axum::Extension;

use crate::api::extractors::ValidatedJson;
use crate::api::v1::dto::{CreatePurchaseRequest, DeletedResponse};
use crate::api::v1::middleware::{ensure_owner_or_admin, SessionContext};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::{Result, VitrinaError};
use crate::models::{EnrichedRecord, PurchaseRecord, SortOrder, SourceRecord};

async fn hydrate_purchases(
    state: &AppState,
    session: &SessionContext,
    purchases: Vec<PurchaseRecord>,
) -> Result<Vec<EnrichedRecord>> {
    let records = purchases.into_iter().map(SourceRecord::from).collect();
    state
        .hydration
        .hydrate(records, &session.access_token, Some(&session.user_id))
        .await
}

async fn hydrate_purchase(
    state: &AppState,
    session: &SessionContext,
    purchase: PurchaseRecord,
) -> Result<EnrichedRecord> {
    let item_id = purchase.item_id.clone();
    hydrate_purchases(state, session, vec![purchase])
        .await?
        .pop()
        .ok_or(VitrinaError::JoinMismatch { item_id })
}

/// `POST /api/v1/purchases`
///
/// The item is hydrated before the purchase is stored, so unknown items are
/// rejected without leaving a record behind.
#[utoipa::path(
    post,
    path = "/api/v1/purchases",
    tag = "purchases",
    operation_id = "purchases.create",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded", body = EnrichedRecord),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ValidatedJson(req): ValidatedJson<CreatePurchaseRequest>,
) -> ApiResponse<EnrichedRecord> {
    let purchase = PurchaseRecord::new(
        session.user_id.clone(),
        req.item_id,
        req.price,
        req.quantity,
    );

    let result = async {
        let enriched = hydrate_purchase(&state, &session, purchase.clone()).await?;
        state.db.create_purchase(&purchase).await?;
        Ok::<_, VitrinaError>(enriched)
    }
    .await;

    match result {
        Ok(enriched) => ApiResponse::created(enriched),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/purchases`
#[utoipa::path(
    get,
    path = "/api/v1/purchases",
    tag = "purchases",
    operation_id = "purchases.list",
    responses(
        (status = 200, description = "All purchases, oldest first", body = Vec<EnrichedRecord>),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<Vec<EnrichedRecord>> {
    let result = async {
        let purchases = state.db.list_purchases().await?;
        hydrate_purchases(&state, &session, purchases).await
    }
    .await;

    match result {
        Ok(enriched) => ApiResponse::success(enriched),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/purchases/{purchaseId}`
#[utoipa::path(
    get,
    path = "/api/v1/purchases/{purchaseId}",
    tag = "purchases",
    operation_id = "purchases.get",
    params(("purchaseId" = String, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Hydrated purchase", body = EnrichedRecord),
        (status = 404, description = "Purchase not found", body = ApiError),
    )
)]
pub async fn get_purchase(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResponse<EnrichedRecord> {
    let purchase = match state.db.get_purchase(&id).await {
        Ok(Some(purchase)) => purchase,
        Ok(None) => {
            return ApiResponse::error(ErrorCode::NotFound, format!("Purchase {id} not found"))
        }
        Err(e) => return e.into(),
    };

    match hydrate_purchase(&state, &session, purchase).await {
        Ok(enriched) => ApiResponse::success(enriched),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/purchases/user/{userId}`
#[utoipa::path(
    get,
    path = "/api/v1/purchases/user/{userId}",
    tag = "purchases",
    operation_id = "purchases.listByUser",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's purchases, oldest first", body = Vec<EnrichedRecord>),
        (status = 502, description = "Marketplace failure", body = ApiError),
    )
)]
pub async fn list_user_purchases(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(user_id): Path<String>,
) -> ApiResponse<Vec<EnrichedRecord>> {
    let result = async {
        let purchases = state
            .db
            .list_purchases_by_user(&user_id, SortOrder::Ascending)
            .await?;
        hydrate_purchases(&state, &session, purchases).await
    }
    .await;

    match result {
        Ok(enriched) => ApiResponse::success(enriched),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/purchases/{purchaseId}`
#[utoipa::path(
    delete,
    path = "/api/v1/purchases/{purchaseId}",
    tag = "purchases",
    operation_id = "purchases.delete",
    params(("purchaseId" = String, Path, description = "Purchase ID")),
    responses(
        (status = 200, description = "Purchase deleted", body = DeletedResponse),
        (status = 403, description = "Not the buyer", body = ApiError),
        (status = 404, description = "Purchase not found", body = ApiError),
    )
)]
pub async fn delete_purchase(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResponse<DeletedResponse> {
    let result = async {
        let existing = state
            .db
            .get_purchase(&id)
            .await?
            .ok_or_else(|| VitrinaError::NotFound(format!("Purchase {id} not found")))?;
        ensure_owner_or_admin(&state, &session, &existing.user_id).await?;
        state.db.delete_purchase(&id).await
    }
    .await;

    match result {
        Ok(true) => ApiResponse::success(DeletedResponse::new(id)),
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, format!("Purchase {id} not found")),
        Err(e) => e.into(),
    }
}
