use thiserror::Error;

#[derive(Error, Debug)]
pub enum VitrinaError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The marketplace answered with an error status or could not be reached.
    #[error("Upstream lookup failed: {0}")]
    Upstream(String),

    /// The marketplace answered, but the product shape is unusable (e.g. no pictures).
    #[error("Upstream returned a malformed product {item_id}: {reason}")]
    UpstreamShape { item_id: String, reason: String },

    /// A batch lookup response did not contain the requested item.
    #[error("Batch lookup returned no product for item {item_id}")]
    JoinMismatch { item_id: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl VitrinaError {
    /// True for failures originating in the product lookup gateway.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            VitrinaError::Http(_)
                | VitrinaError::Upstream(_)
                | VitrinaError::UpstreamShape { .. }
                | VitrinaError::JoinMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, VitrinaError>;
