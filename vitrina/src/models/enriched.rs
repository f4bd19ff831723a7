use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{FavoriteRecord, HydratedProduct, PurchaseRecord, SearchPaging};

/// A stored record (or a raw marketplace item) joined with live product data.
///
/// Built per request and never persisted. Which optional fields are present
/// depends on the source record:
///
/// - favorites carry `favoriteId`, `rating`, `comment` and `createdDateFavorite`
/// - purchases carry `purchaseId`, `price`, `quantity` and `createdDatePurchase`
/// - purchases and raw items that match one of the acting user's favorites also
///   carry the favorite's fields plus `isFavorite: true`
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_favorite: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_purchase: Option<DateTime<Utc>>,

    pub hydrated: HydratedProduct,
}

impl EnrichedRecord {
    fn bare(item_id: String, hydrated: HydratedProduct) -> Self {
        Self {
            item_id,
            user_id: None,
            favorite_id: None,
            rating: None,
            comment: None,
            created_date_favorite: None,
            is_favorite: None,
            purchase_id: None,
            price: None,
            quantity: None,
            created_date_purchase: None,
            hydrated,
        }
    }

    pub fn from_favorite(favorite: FavoriteRecord, hydrated: HydratedProduct) -> Self {
        Self {
            user_id: Some(favorite.user_id),
            favorite_id: Some(favorite.id),
            rating: favorite.rating,
            comment: favorite.comment,
            created_date_favorite: Some(favorite.created_at),
            ..Self::bare(favorite.item_id, hydrated)
        }
    }

    pub fn from_purchase(purchase: PurchaseRecord, hydrated: HydratedProduct) -> Self {
        Self {
            user_id: Some(purchase.user_id),
            purchase_id: Some(purchase.id),
            price: Some(purchase.price),
            quantity: Some(purchase.quantity),
            created_date_purchase: Some(purchase.created_at),
            ..Self::bare(purchase.item_id, hydrated)
        }
    }

    pub fn from_item(item_id: String, hydrated: HydratedProduct) -> Self {
        Self::bare(item_id, hydrated)
    }

    /// Merge the acting user's favorite for this item.
    ///
    /// Favorite fields overwrite existing ones when the favorite has them;
    /// absent favorite fields leave the record untouched.
    pub fn with_favorite(mut self, favorite: &FavoriteRecord) -> Self {
        self.favorite_id = Some(favorite.id.clone());
        if favorite.rating.is_some() {
            self.rating = favorite.rating;
        }
        if favorite.comment.is_some() {
            self.comment = favorite.comment.clone();
        }
        self.created_date_favorite = Some(favorite.created_at);
        self.is_favorite = Some(true);
        self
    }
}

/// A marketplace search page whose results have been hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct SearchResults {
    pub paging: SearchPaging,
    pub results: Vec<EnrichedRecord>,
}

/// A record that references a marketplace item and can be hydrated.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Favorite(FavoriteRecord),
    Purchase(PurchaseRecord),
    /// A bare item id, e.g. a marketplace search result.
    Item(String),
}

impl SourceRecord {
    pub fn item_id(&self) -> &str {
        match self {
            Self::Favorite(f) => &f.item_id,
            Self::Purchase(p) => &p.item_id,
            Self::Item(id) => id,
        }
    }

    /// Favorites already carry their own annotation.
    pub fn accepts_cross_reference(&self) -> bool {
        !matches!(self, Self::Favorite(_))
    }

    pub fn enrich(self, hydrated: HydratedProduct) -> EnrichedRecord {
        match self {
            Self::Favorite(f) => EnrichedRecord::from_favorite(f, hydrated),
            Self::Purchase(p) => EnrichedRecord::from_purchase(p, hydrated),
            Self::Item(id) => EnrichedRecord::from_item(id, hydrated),
        }
    }
}

impl From<FavoriteRecord> for SourceRecord {
    fn from(record: FavoriteRecord) -> Self {
        Self::Favorite(record)
    }
}

impl From<PurchaseRecord> for SourceRecord {
    fn from(record: PurchaseRecord) -> Self {
        Self::Purchase(record)
    }
}
