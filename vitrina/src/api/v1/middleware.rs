//! # V1 Session Authentication Middleware
//!
//! Protects every v1 route except the public ones (`/health`, `/openapi.json`,
//! `/docs`, `/auth/login`) with a session token sent as
//! `Authorization: Bearer <token>`. A valid session is exposed to handlers as a
//! [`SessionContext`] request extension.
//!
//! Admin-only routes add [`admin_middleware`] inside the session layer.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::models::ADMIN_ROLE;

use super::response::{ApiResponse, ErrorCode};

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub user_id: String,
    /// Marketplace credential handed to the hydration engine.
    pub access_token: String,
}

fn bearer_token(request: &Request<Body>) -> Result<String, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Invalid authorization header format. Expected: Bearer <token>",
            )
            .into_response()),
        },
        None => Err(
            ApiResponse::<()>::error(ErrorCode::Unauthorized, "Missing authorization header")
                .into_response(),
        ),
    }
}

/// Resolves the bearer token to a live session or answers 401.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(response) => return response,
    };

    match state.auth.authenticate(&token).await {
        Ok(session) => {
            request.extensions_mut().insert(SessionContext {
                token: session.token,
                user_id: session.user_id,
                access_token: session.access_token,
            });
            next.run(request).await
        }
        Err(e) => ApiResponse::<()>::from(e).into_response(),
    }
}

/// Requires the session's user to hold the `admin` role. Must run after
/// [`session_auth_middleware`].
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user_id) = request
        .extensions()
        .get::<SessionContext>()
        .map(|ctx| ctx.user_id.clone())
    else {
        return ApiResponse::<()>::error(ErrorCode::Unauthorized, "Authentication required")
            .into_response();
    };

    match state.db.user_has_role(&user_id, ADMIN_ROLE).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            ApiResponse::<()>::error(ErrorCode::Forbidden, "Admin role required").into_response()
        }
        Err(e) => ApiResponse::<()>::from(e).into_response(),
    }
}

/// Callers may act on their own records; admins may act on anyone's.
pub(crate) async fn ensure_owner_or_admin(
    state: &AppState,
    session: &SessionContext,
    owner_id: &str,
) -> crate::error::Result<()> {
    if session.user_id == owner_id || state.db.user_has_role(&session.user_id, ADMIN_ROLE).await? {
        Ok(())
    } else {
        Err(crate::error::VitrinaError::Forbidden(
            "Not allowed to modify another user's records".to_string(),
        ))
    }
}
