use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RATING: u8 = 10;
pub const MAX_COMMENT_CHARS: usize = 500;

/// A user's favorite marketplace item. At most one per (user, item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FavoriteRecord {
    pub fn new(user_id: String, item_id: String) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id,
            item_id,
            rating: None,
            comment: None,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a favorite's annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}
