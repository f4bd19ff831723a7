//! Shared DTO types used across several v1 endpoints.

use serde::{Deserialize, Serialize};

use crate::models::SortOrder;

/// Returned by every `DELETE` endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
        }
    }
}

/// Query string for listings ordered by creation date.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
}

impl OrderQuery {
    pub fn sort_order(&self, default: SortOrder) -> Result<SortOrder, String> {
        match self.order.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(default),
        }
    }
}
