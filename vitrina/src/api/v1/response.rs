//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope with three optional
//! top-level fields:
//!
//! ```json
//! {
//!   "data": { ... },                                     // present on success
//!   "meta": { "total": 1200, "offset": 0, "limit": 50 }, // search paging
//!   "error": { "code": "not_found", "message": "..." }   // present on error
//! }
//! ```
//!
//! ## ID Formats
//!
//! - **favoriteId**, **purchaseId**, **userId**, **roleId**, **permissionId**:
//!   nanoid, 21 characters
//! - **session token**: nanoid, 32 characters
//! - **itemId**: opaque marketplace identifier (e.g. `"MLA1234567"`)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::VitrinaError;
use crate::models::SearchPaging;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request was malformed or failed validation. HTTP 400.
    InvalidRequest,
    /// Missing, invalid or expired session. HTTP 401.
    Unauthorized,
    /// The session is valid but lacks the required role. HTTP 403.
    Forbidden,
    /// The requested resource does not exist. HTTP 404.
    NotFound,
    /// The request conflicts with existing data (e.g. duplicate favorite). HTTP 409.
    Conflict,
    /// The marketplace failed or returned data that could not be joined. HTTP 502.
    UpstreamError,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Paging metadata attached to marketplace search responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Total number of upstream matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl From<SearchPaging> for ResponseMeta {
    fn from(paging: SearchPaging) -> Self {
        Self {
            total: Some(paging.total),
            offset: Some(paging.offset),
            limit: Some(paging.limit),
        }
    }
}

/// Canonical v1 API response envelope.
///
/// On success, `data` is present and `error` is absent. On error, `error` is
/// present and `data` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<VitrinaError> for ApiResponse<T> {
    /// Convert a [`VitrinaError`] into a v1 [`ApiResponse`].
    ///
    /// Internal error details are never leaked to the client; they are logged
    /// via `tracing::error!` and replaced with a generic message.
    fn from(err: VitrinaError) -> Self {
        match err {
            VitrinaError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),
            VitrinaError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),
            VitrinaError::Conflict(msg) => ApiResponse::error(ErrorCode::Conflict, msg),
            VitrinaError::Unauthorized(msg) => ApiResponse::error(ErrorCode::Unauthorized, msg),
            VitrinaError::Forbidden(msg) => ApiResponse::error(ErrorCode::Forbidden, msg),

            VitrinaError::Json(ref e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ref upstream if upstream.is_upstream() => {
                tracing::warn!(error = %upstream, "Marketplace failure mapped to v1 response");
                ApiResponse::error(
                    ErrorCode::UpstreamError,
                    "The marketplace could not serve this request",
                )
            }

            internal => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

impl IntoResponse for VitrinaError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_serializes_without_error() {
        let resp = ApiResponse::success("hello");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["data"], "hello");
        assert!(json.get("error").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn error_response_serializes_without_data() {
        let resp = ApiResponse::<()>::error(ErrorCode::NotFound, "gone");
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "not_found");
        assert_eq!(json["error"]["message"], "gone");
    }

    #[test]
    fn search_paging_becomes_meta() {
        let meta = ResponseMeta::from(SearchPaging {
            total: 1200,
            offset: 50,
            limit: 50,
        });
        let resp = ApiResponse::success_with_meta(vec![1, 2], meta);
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["meta"]["total"], 1200);
        assert_eq!(json["meta"]["offset"], 50);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::UpstreamError.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_value(&ErrorCode::UpstreamError).expect("serialize");
        assert_eq!(json, "upstream_error");
        assert_eq!(ErrorCode::InvalidRequest.to_string(), "invalid_request");
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let resp: ApiResponse<()> = VitrinaError::JoinMismatch {
            item_id: "MLA1".to_string(),
        }
        .into();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(resp.error.unwrap().code, ErrorCode::UpstreamError);

        let resp: ApiResponse<()> = VitrinaError::Upstream("503".to_string()).into();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let resp: ApiResponse<()> =
            VitrinaError::Internal("connection string postgres://secret".to_string()).into();
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["error"]["code"], "internal_error");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn conflict_and_forbidden_pass_message_through() {
        let resp: ApiResponse<()> = VitrinaError::Conflict("already favorited".to_string()).into();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(resp.error.unwrap().message, "already favorited");

        let resp: ApiResponse<()> = VitrinaError::Forbidden("admin only".to_string()).into();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
