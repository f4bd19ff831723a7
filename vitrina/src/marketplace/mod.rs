//! Product Lookup Gateway: live product data from the external marketplace.

mod client;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ItemEnvelope, ProductSnapshot, SearchPage, SearchQuery};

pub use client::MarketplaceClient;

/// Read operations against the marketplace product catalogue.
///
/// Every call carries the caller's marketplace access credential. Errors are
/// terminal for the request; implementations do not retry.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Fetch a single product. Missing products fail with `NotFound`.
    async fn fetch_item(&self, id: &str, credential: &str) -> Result<ProductSnapshot>;

    /// Fetch several products in one call.
    ///
    /// The result order is not tied to `ids`, and ids unknown upstream may be
    /// missing from the result.
    async fn fetch_items(&self, ids: &[String], credential: &str) -> Result<Vec<ItemEnvelope>>;

    /// Run a catalogue search and return the raw result stubs.
    async fn search(&self, query: &SearchQuery, credential: &str) -> Result<SearchPage>;
}
