use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub price: f64,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl PurchaseRecord {
    pub fn new(user_id: String, item_id: String, price: f64, quantity: u32) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id,
            item_id,
            price,
            quantity,
            created_at: Utc::now(),
        }
    }
}
