use serde::Deserialize;
use validator::Validate;

use crate::models::FavoriteUpdate;

/// Request body for `POST /v1/favorites`. The owner is the session's user.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFavoriteRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[validate(range(max = 10))]
    pub rating: Option<u8>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

/// Request body for `PATCH /v1/favorites/{favoriteId}`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFavoriteRequest {
    #[validate(range(max = 10))]
    pub rating: Option<u8>,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

impl From<UpdateFavoriteRequest> for FavoriteUpdate {
    fn from(req: UpdateFavoriteRequest) -> Self {
        Self {
            rating: req.rating,
            comment: req.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_COMMENT_CHARS;

    #[test]
    fn rating_above_ten_is_rejected() {
        let req = CreateFavoriteRequest {
            item_id: "MLA1".to_string(),
            rating: Some(11),
            comment: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn comment_length_counts_characters() {
        let req = UpdateFavoriteRequest {
            rating: Some(10),
            comment: Some("ñ".repeat(MAX_COMMENT_CHARS)),
        };
        assert!(req.validate().is_ok());

        let req = UpdateFavoriteRequest {
            rating: None,
            comment: Some("a".repeat(MAX_COMMENT_CHARS + 1)),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_item_id_is_rejected() {
        let req: CreateFavoriteRequest = serde_json::from_str(r#"{"itemId": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
