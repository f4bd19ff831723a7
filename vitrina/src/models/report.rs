use serde::Serialize;

use super::{EnrichedRecord, HydratedProduct, PurchaseRecord, UserProfile, UserSummary};

/// One favorite inside a top-favorited group.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteGroupEntry {
    pub favorite_id: String,
    pub item_id: String,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    /// `None` when the favoriting user no longer exists.
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopFavoritedItem {
    pub item_id: String,
    pub count: u32,
    pub items: Vec<FavoriteGroupEntry>,
    pub average_rating: Option<f64>,
    pub hydrated: HydratedProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub item_id: String,
    pub count: u32,
    pub units_sold: u64,
    pub items: Vec<PurchaseRecord>,
    pub hydrated: HydratedProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopPurchaser {
    pub user_id: String,
    pub count: u32,
    pub user: UserProfile,
    pub last_purchase: EnrichedRecord,
}
