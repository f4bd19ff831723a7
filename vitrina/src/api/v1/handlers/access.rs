//! v1 role and permission handlers. Reads are open to any session; writes are
//! mounted behind the admin role check.

use axum::extract::{Path, State};

use crate::api::extractors::ValidatedJson;
use crate::api::v1::dto::{CreatePermissionRequest, CreateRoleRequest, DeletedResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::VitrinaError;
use crate::models::{Permission, Role};

/// `GET /api/v1/roles`
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "access",
    operation_id = "roles.list",
    responses((status = 200, description = "All roles with their permissions", body = Vec<Role>))
)]
pub async fn list_roles(State(state): State<AppState>) -> ApiResponse<Vec<Role>> {
    match state.db.list_roles().await {
        Ok(roles) => ApiResponse::success(roles),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/roles/{roleId}`
#[utoipa::path(
    get,
    path = "/api/v1/roles/{roleId}",
    tag = "access",
    operation_id = "roles.get",
    params(("roleId" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 404, description = "Role not found", body = ApiError),
    )
)]
pub async fn get_role(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse<Role> {
    match state.db.get_role(&id).await {
        Ok(Some(role)) => ApiResponse::success(role),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Role {id} not found")),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/roles`
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "access",
    operation_id = "roles.create",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Unknown permission", body = ApiError),
        (status = 409, description = "Role name taken", body = ApiError),
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> ApiResponse<Role> {
    let role = Role::new(req.name, req.description);
    let result = async {
        state.db.create_role(&role, &req.permission_ids).await?;
        state
            .db
            .get_role(&role.id)
            .await?
            .ok_or_else(|| VitrinaError::Internal("Role vanished after insert".to_string()))
    }
    .await;

    match result {
        Ok(role) => ApiResponse::created(role),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/roles/{roleId}`
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{roleId}",
    tag = "access",
    operation_id = "roles.delete",
    params(("roleId" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = DeletedResponse),
        (status = 404, description = "Role not found", body = ApiError),
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<DeletedResponse> {
    match state.db.delete_role(&id).await {
        Ok(true) => ApiResponse::success(DeletedResponse::new(id)),
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, format!("Role {id} not found")),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/permissions`
#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    tag = "access",
    operation_id = "permissions.list",
    responses((status = 200, description = "All permissions", body = Vec<Permission>))
)]
pub async fn list_permissions(State(state): State<AppState>) -> ApiResponse<Vec<Permission>> {
    match state.db.list_permissions().await {
        Ok(permissions) => ApiResponse::success(permissions),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/permissions`
#[utoipa::path(
    post,
    path = "/api/v1/permissions",
    tag = "access",
    operation_id = "permissions.create",
    request_body = CreatePermissionRequest,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 409, description = "Permission name taken", body = ApiError),
    )
)]
pub async fn create_permission(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreatePermissionRequest>,
) -> ApiResponse<Permission> {
    let permission = Permission::new(req.name, req.description);
    match state.db.create_permission(&permission).await {
        Ok(()) => ApiResponse::created(permission),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/permissions/{permissionId}`
#[utoipa::path(
    delete,
    path = "/api/v1/permissions/{permissionId}",
    tag = "access",
    operation_id = "permissions.delete",
    params(("permissionId" = String, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission deleted", body = DeletedResponse),
        (status = 404, description = "Permission not found", body = ApiError),
    )
)]
pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<DeletedResponse> {
    match state.db.delete_permission(&id).await {
        Ok(true) => ApiResponse::success(DeletedResponse::new(id)),
        Ok(false) => {
            ApiResponse::error(ErrorCode::NotFound, format!("Permission {id} not found"))
        }
        Err(e) => e.into(),
    }
}
