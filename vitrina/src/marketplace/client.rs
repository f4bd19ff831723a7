use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, StatusCode,
};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::ProductLookup;
use crate::config::MarketplaceConfig;
use crate::error::{Result, VitrinaError};
use crate::models::{ItemEnvelope, ProductSnapshot, SearchPage, SearchQuery};

/// Attributes requested from the multi-get endpoint.
const BATCH_ATTRIBUTES: &str = "id,title,pictures,price";

#[derive(Debug, Deserialize)]
struct BatchEntry {
    code: u16,
    body: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// reqwest-backed client for the marketplace REST API.
#[derive(Clone)]
pub struct MarketplaceClient {
    client: Client,
    config: MarketplaceConfig,
}

impl MarketplaceClient {
    pub fn new(config: MarketplaceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VitrinaError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// `{base}/seg/seg/...`, each segment percent-encoded on its own so that
    /// caller-supplied ids cannot change the path.
    fn segment_endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| {
                VitrinaError::Internal(format!(
                    "Marketplace base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(credential: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {credential}"))
                .map_err(|e| VitrinaError::Validation(format!("Invalid access token: {e}")))?,
        );
        Ok(headers)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        credential: &str,
        not_found: impl FnOnce() -> VitrinaError,
    ) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .headers(Self::auth_headers(credential)?)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VitrinaError::Upstream(format!(
                "Marketplace error {status}: {body}"
            )));
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| VitrinaError::Upstream(format!("Unexpected marketplace response: {e}")))
    }

    /// Exchange the configured refresh token for a fresh access token.
    ///
    /// A statically configured access token short-circuits the exchange.
    pub async fn refresh_access_token(&self) -> Result<String> {
        if let Some(ref token) = self.config.access_token {
            return Ok(token.clone());
        }

        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.refresh_token.as_deref(),
        ) else {
            return Err(VitrinaError::Internal(
                "Marketplace OAuth credentials are not configured".to_string(),
            ));
        };

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ];

        let resp = self
            .client
            .post(self.endpoint("/oauth/token")?)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VitrinaError::Upstream(format!(
                "Token refresh failed {status}: {body}"
            )));
        }

        let token: TokenResponse = resp.json().await?;
        tracing::debug!("Refreshed marketplace access token");
        Ok(token.access_token)
    }
}

#[async_trait]
impl ProductLookup for MarketplaceClient {
    async fn fetch_item(&self, id: &str, credential: &str) -> Result<ProductSnapshot> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(VitrinaError::NotFound(format!("Item {id} not found")));
        }
        let url = self.segment_endpoint(&["items", id])?;
        self.get_json(url, credential, || {
            VitrinaError::NotFound(format!("Item {id} not found"))
        })
        .await
    }

    async fn fetch_items(&self, ids: &[String], credential: &str) -> Result<Vec<ItemEnvelope>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("/items")?;
        url.query_pairs_mut()
            .append_pair("ids", &ids.join(","))
            .append_pair("attributes", BATCH_ATTRIBUTES);

        let entries: Vec<BatchEntry> = self
            .get_json(url, credential, || {
                VitrinaError::Upstream("Batch item lookup returned 404".to_string())
            })
            .await?;

        let mut found = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.code != 200 {
                tracing::debug!(code = entry.code, "Skipping unavailable batch entry");
                continue;
            }
            match serde_json::from_value::<ProductSnapshot>(entry.body) {
                Ok(body) => found.push(ItemEnvelope::from(body)),
                Err(e) => tracing::debug!(error = %e, "Skipping unparseable batch entry"),
            }
        }

        Ok(found)
    }

    async fn search(&self, query: &SearchQuery, credential: &str) -> Result<SearchPage> {
        let mut url = self.segment_endpoint(&["sites", self.config.site_id.as_str(), "search"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.q);
            if let Some(offset) = query.offset {
                pairs.append_pair("offset", &offset.to_string());
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            pairs.append_pair("status", "active");
        }

        self.get_json(url, credential, || {
            VitrinaError::NotFound(format!("Site {} not found", self.config.site_id))
        })
        .await
    }
}
