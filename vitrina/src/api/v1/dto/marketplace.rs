use serde::Deserialize;
use validator::Validate;

use crate::models::SearchQuery;

/// Query string for `GET /v1/marketplace/search`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query.
    #[validate(length(min = 1))]
    pub q: String,
    pub offset: Option<u32>,
    /// Page size accepted by the marketplace (1-50).
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<u32>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        Self {
            q: params.q,
            offset: params.offset,
            limit: params.limit,
        }
    }
}
