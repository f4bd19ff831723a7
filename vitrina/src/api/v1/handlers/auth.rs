//! v1 session handlers.

use axum::extract::State;
use axum::Extension;

use crate::api::extractors::ValidatedJson;
use crate::api::v1::dto::{AckResponse, LoginRequest, LoginResponse};
use crate::api::v1::middleware::SessionContext;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::User;

/// `POST /api/v1/auth/login`
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    operation_id = "auth.login",
    request_body = LoginRequest,
    security(()),
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = ApiError),
        (status = 502, description = "Marketplace token exchange failed", body = ApiError),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResponse<LoginResponse> {
    match state.auth.login(&req.email, &req.password).await {
        Ok((session, user)) => ApiResponse::success(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user,
        }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/auth/refresh`
///
/// Exchanges a new marketplace access token for the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    operation_id = "auth.refresh",
    responses(
        (status = 200, description = "Marketplace token refreshed", body = AckResponse),
        (status = 401, description = "Invalid session", body = ApiError),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<AckResponse> {
    match state.auth.refresh(&session.token).await {
        Ok(_) => ApiResponse::success(AckResponse { ok: true }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/auth/logout`
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    operation_id = "auth.logout",
    responses(
        (status = 200, description = "Session closed", body = AckResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<AckResponse> {
    match state.auth.logout(&session.token).await {
        Ok(()) => ApiResponse::success(AckResponse { ok: true }),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/auth/me`
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    operation_id = "auth.me",
    responses(
        (status = 200, description = "The session's user", body = User),
        (status = 401, description = "Invalid session", body = ApiError),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResponse<User> {
    match state.db.get_user(&session.user_id).await {
        Ok(Some(user)) => ApiResponse::success(user),
        Ok(None) => ApiResponse::error(ErrorCode::Unauthorized, "Session user no longer exists"),
        Err(e) => e.into(),
    }
}
