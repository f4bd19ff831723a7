use serde::Deserialize;
use validator::Validate;

/// Request body for `POST /v1/purchases`. The buyer is the session's user.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub quantity: u32,
}
