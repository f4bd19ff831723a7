//! v1 user administration handlers. Mounted behind the admin role check.

use axum::extract::{Path, State};

use crate::api::extractors::ValidatedJson;
use crate::api::v1::dto::{CreateUserRequest, DeletedResponse, UpdateUserRequest};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::User;

/// `GET /api/v1/users`
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    operation_id = "users.list",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Admin role required", body = ApiError),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResponse<Vec<User>> {
    match state.db.list_users().await {
        Ok(users) => ApiResponse::success(users),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/users`
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    operation_id = "users.create",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request or unknown role", body = ApiError),
        (status = 409, description = "Email or username taken", body = ApiError),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResponse<User> {
    match state.auth.create_user(req.into()).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User created");
            ApiResponse::created(user)
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/users/{userId}`
#[utoipa::path(
    get,
    path = "/api/v1/users/{userId}",
    tag = "users",
    operation_id = "users.get",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ApiError),
    )
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse<User> {
    match state.db.get_user(&id).await {
        Ok(Some(user)) => ApiResponse::success(user),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("User {id} not found")),
        Err(e) => e.into(),
    }
}

/// `PATCH /api/v1/users/{userId}`
#[utoipa::path(
    patch,
    path = "/api/v1/users/{userId}",
    tag = "users",
    operation_id = "users.update",
    params(("userId" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = ApiError),
        (status = 409, description = "Email or username taken", body = ApiError),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> ApiResponse<User> {
    let (update, password) = req.into_parts();
    match state
        .auth
        .update_user(&id, update, password.as_deref())
        .await
    {
        Ok(user) => ApiResponse::success(user),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/users/{userId}`
///
/// Also removes the user's sessions, favorites and purchases.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{userId}",
    tag = "users",
    operation_id = "users.delete",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = DeletedResponse),
        (status = 404, description = "User not found", body = ApiError),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<DeletedResponse> {
    match state.db.delete_user(&id).await {
        Ok(true) => {
            tracing::info!(user_id = %id, "User deleted");
            ApiResponse::success(DeletedResponse::new(id))
        }
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, format!("User {id} not found")),
        Err(e) => e.into(),
    }
}
