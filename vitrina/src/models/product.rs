use serde::{Deserialize, Serialize};

use crate::error::{Result, VitrinaError};

/// A product picture as published by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Picture {
    pub id: String,
    pub url: String,
}

/// Live product data fetched from the marketplace. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProductSnapshot {
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

/// One entry of a batch lookup response, keyed by the product id it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEnvelope {
    pub id: String,
    pub body: ProductSnapshot,
}

impl From<ProductSnapshot> for ItemEnvelope {
    fn from(body: ProductSnapshot) -> Self {
        Self {
            id: body.id.clone(),
            body,
        }
    }
}

/// A raw result stub returned by a marketplace search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchResultStub {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnail_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchPaging {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub paging: SearchPaging,
    #[serde(default)]
    pub results: Vec<SearchResultStub>,
}

/// Parameters of a marketplace search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub q: String,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// The `hydrated` block attached to every enriched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HydratedProduct {
    pub item_id: String,
    pub title: String,
    /// URL of the first picture.
    pub thumbnail: String,
    /// Id of the first picture.
    #[serde(rename = "thumbnail_id")]
    pub thumbnail_id: String,
    pub pictures: Vec<Picture>,
    pub price: f64,
}

impl TryFrom<ProductSnapshot> for HydratedProduct {
    type Error = VitrinaError;

    fn try_from(snapshot: ProductSnapshot) -> Result<Self> {
        let Some(first) = snapshot.pictures.first() else {
            return Err(VitrinaError::UpstreamShape {
                item_id: snapshot.id,
                reason: "product has no pictures".to_string(),
            });
        };

        Ok(Self {
            thumbnail: first.url.clone(),
            thumbnail_id: first.id.clone(),
            item_id: snapshot.id,
            title: snapshot.title,
            pictures: snapshot.pictures,
            price: snapshot.price,
        })
    }
}
