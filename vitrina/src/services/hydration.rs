use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::db::DatabaseBackend;
use crate::error::{Result, VitrinaError};
use crate::marketplace::ProductLookup;
use crate::models::{
    EnrichedRecord, FavoriteRecord, HydratedProduct, ItemEnvelope, ProductSnapshot, SearchQuery,
    SearchResults, SourceRecord,
};

/// Joins stored records with live marketplace product data.
///
/// Nothing here writes to the stores. Every gateway or store error aborts the
/// whole call; there is no partial hydration.
#[derive(Clone)]
pub struct HydrationEngine {
    db: Arc<dyn DatabaseBackend>,
    lookup: Arc<dyn ProductLookup>,
}

impl HydrationEngine {
    pub fn new(db: Arc<dyn DatabaseBackend>, lookup: Arc<dyn ProductLookup>) -> Self {
        Self { db, lookup }
    }

    /// Hydrate a single record with a single-item lookup.
    pub async fn hydrate_one(
        &self,
        record: SourceRecord,
        credential: &str,
    ) -> Result<EnrichedRecord> {
        let snapshot = self.lookup.fetch_item(record.item_id(), credential).await?;
        let hydrated = HydratedProduct::try_from(snapshot)?;
        Ok(record.enrich(hydrated))
    }

    /// Hydrate `records` with one batch lookup, preserving input order.
    ///
    /// An empty input returns immediately without touching the gateway. A
    /// record whose item is missing from the batch response fails the whole
    /// call with `JoinMismatch`.
    pub async fn hydrate_many(
        &self,
        records: Vec<SourceRecord>,
        credential: &str,
    ) -> Result<Vec<EnrichedRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids = unique_ids(records.iter().map(SourceRecord::item_id));
        let index = self.fetch_products(&ids, credential).await?;

        records
            .into_iter()
            .map(|record| {
                let hydrated = index.hydrated(record.item_id())?;
                Ok(record.enrich(hydrated))
            })
            .collect()
    }

    /// Hydrate `records` and, when `user_id` is given, mark the ones the user
    /// has favorited.
    ///
    /// Favorite records are never cross-referenced; they already carry their
    /// own annotation.
    pub async fn hydrate(
        &self,
        records: Vec<SourceRecord>,
        credential: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<EnrichedRecord>> {
        let eligible: Vec<bool> = records
            .iter()
            .map(SourceRecord::accepts_cross_reference)
            .collect();
        let enriched = self.hydrate_many(records, credential).await?;

        match user_id {
            Some(user_id) => self.cross_reference(user_id, enriched, &eligible).await,
            None => Ok(enriched),
        }
    }

    /// Merge the user's favorite for `partial.item_id` into `partial`, if any.
    ///
    /// Point query; batch callers go through [`HydrationEngine::hydrate`].
    pub async fn hydrate_favorite_cross_reference(
        &self,
        user_id: &str,
        partial: EnrichedRecord,
    ) -> Result<EnrichedRecord> {
        match self.db.find_favorite(user_id, &partial.item_id).await? {
            Some(favorite) => Ok(partial.with_favorite(&favorite)),
            None => Ok(partial),
        }
    }

    /// Hydrate one marketplace item by id.
    pub async fn hydrate_item(
        &self,
        item_id: &str,
        credential: &str,
        user_id: Option<&str>,
    ) -> Result<EnrichedRecord> {
        let enriched = self
            .hydrate_one(SourceRecord::Item(item_id.to_string()), credential)
            .await?;

        match user_id {
            Some(user_id) => self.hydrate_favorite_cross_reference(user_id, enriched).await,
            None => Ok(enriched),
        }
    }

    /// Run a marketplace search and hydrate its results.
    pub async fn search(
        &self,
        query: &SearchQuery,
        credential: &str,
        user_id: Option<&str>,
    ) -> Result<SearchResults> {
        let page = self.lookup.search(query, credential).await?;
        debug!(q = %query.q, results = page.results.len(), "Hydrating search results");

        let records = page
            .results
            .into_iter()
            .map(|stub| SourceRecord::Item(stub.id))
            .collect();
        let results = self.hydrate(records, credential, user_id).await?;

        Ok(SearchResults {
            paging: page.paging,
            results,
        })
    }

    /// One batch lookup for `ids`, indexed by product id.
    pub(crate) async fn fetch_products(
        &self,
        ids: &[String],
        credential: &str,
    ) -> Result<ProductIndex> {
        if ids.is_empty() {
            return Ok(ProductIndex::default());
        }

        debug!(count = ids.len(), "Batch product lookup");
        let envelopes = self.lookup.fetch_items(ids, credential).await?;
        Ok(ProductIndex::from_envelopes(envelopes))
    }

    async fn cross_reference(
        &self,
        user_id: &str,
        records: Vec<EnrichedRecord>,
        eligible: &[bool],
    ) -> Result<Vec<EnrichedRecord>> {
        let item_ids = unique_ids(
            records
                .iter()
                .zip(eligible)
                .filter(|(_, eligible)| **eligible)
                .map(|(record, _)| record.item_id.as_str()),
        );
        if item_ids.is_empty() {
            return Ok(records);
        }

        let favorites: HashMap<String, FavoriteRecord> = self
            .db
            .find_favorites_for_items(user_id, &item_ids)
            .await?
            .into_iter()
            .map(|f| (f.item_id.clone(), f))
            .collect();

        Ok(records
            .into_iter()
            .zip(eligible)
            .map(|(record, eligible)| match favorites.get(&record.item_id) {
                Some(favorite) if *eligible => record.with_favorite(favorite),
                _ => record,
            })
            .collect())
    }
}

/// Products from a batch lookup, keyed by id.
#[derive(Debug, Default)]
pub(crate) struct ProductIndex {
    products: HashMap<String, ProductSnapshot>,
}

impl ProductIndex {
    fn from_envelopes(envelopes: Vec<ItemEnvelope>) -> Self {
        let mut products = HashMap::with_capacity(envelopes.len());
        for envelope in envelopes {
            // First entry wins if upstream repeats an id.
            products.entry(envelope.id).or_insert(envelope.body);
        }
        Self { products }
    }

    /// The hydrated view of `item_id`, or `JoinMismatch` if the batch lacked it.
    pub(crate) fn hydrated(&self, item_id: &str) -> Result<HydratedProduct> {
        let snapshot = self
            .products
            .get(item_id)
            .ok_or_else(|| VitrinaError::JoinMismatch {
                item_id: item_id.to_string(),
            })?;
        HydratedProduct::try_from(snapshot.clone())
    }
}

/// Deduplicate ids, keeping first-seen order.
pub(crate) fn unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Picture, PurchaseRecord, SearchResultStub};
    use crate::services::test_support::{product, test_backend, FakeCatalogue};
    use pretty_assertions::assert_eq;

    fn engine(db: Arc<dyn DatabaseBackend>, catalogue: &Arc<FakeCatalogue>) -> HydrationEngine {
        HydrationEngine::new(db, catalogue.clone())
    }

    fn purchase(user: &str, item: &str) -> SourceRecord {
        SourceRecord::from(PurchaseRecord::new(user.to_string(), item.to_string(), 10.0, 1))
    }

    #[test]
    fn test_unique_ids_keeps_first_seen_order() {
        assert_eq!(
            unique_ids(["b", "a", "b", "c", "a"]),
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
    }

    #[tokio::test]
    async fn test_hydrate_many_preserves_input_order() {
        let (db, _dir) = test_backend().await;
        let catalogue = Arc::new(
            FakeCatalogue::with(vec![
                product("MLA1", "One"),
                product("MLA2", "Two"),
                product("MLA3", "Three"),
            ])
            .reversed(),
        );
        let engine = engine(db, &catalogue);

        let records = vec![
            purchase("u1", "MLA2"),
            purchase("u1", "MLA3"),
            purchase("u1", "MLA1"),
            purchase("u1", "MLA2"),
        ];
        let out = engine.hydrate_many(records, "tok").await.unwrap();

        let titles: Vec<&str> = out.iter().map(|r| r.hydrated.title.as_str()).collect();
        assert_eq!(titles, vec!["Two", "Three", "One", "Two"]);
        assert_eq!(catalogue.batch_calls(), 1);
        assert_eq!(catalogue.last_batch(), vec!["MLA2", "MLA3", "MLA1"]);
    }

    #[tokio::test]
    async fn test_hydrate_many_empty_skips_gateway() {
        let (db, _dir) = test_backend().await;
        let catalogue = Arc::new(FakeCatalogue::with(vec![]));
        let engine = engine(db, &catalogue);

        let out = engine.hydrate_many(Vec::new(), "tok").await.unwrap();
        assert!(out.is_empty());
        assert_eq!(catalogue.batch_calls(), 0);
        assert_eq!(catalogue.single_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_batch_entry_fails_whole_call() {
        let (db, _dir) = test_backend().await;
        let catalogue = Arc::new(FakeCatalogue::with(vec![product("MLA1", "One")]));
        let engine = engine(db, &catalogue);

        let err = engine
            .hydrate_many(vec![purchase("u1", "MLA1"), purchase("u1", "MLA9")], "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, VitrinaError::JoinMismatch { ref item_id } if item_id == "MLA9"));
    }

    #[tokio::test]
    async fn test_product_without_pictures_is_shape_error() {
        let (db, _dir) = test_backend().await;
        let mut bare = product("MLA1", "One");
        bare.pictures.clear();
        let catalogue = Arc::new(FakeCatalogue::with(vec![bare]));
        let engine = engine(db, &catalogue);

        let err = engine
            .hydrate_one(SourceRecord::Item("MLA1".to_string()), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, VitrinaError::UpstreamShape { .. }));
    }

    #[tokio::test]
    async fn test_cross_reference_marks_only_favorited_items() {
        let (db, _dir) = test_backend().await;
        let favorite = FavoriteRecord {
            rating: Some(9),
            comment: Some("love it".to_string()),
            ..FavoriteRecord::new("u1".to_string(), "MLA1".to_string())
        };
        db.create_favorite(&favorite).await.unwrap();

        let catalogue = Arc::new(FakeCatalogue::with(vec![
            product("MLA1", "One"),
            product("MLA2", "Two"),
        ]));
        let engine = engine(db, &catalogue);

        let out = engine
            .hydrate(
                vec![purchase("u1", "MLA1"), purchase("u1", "MLA2")],
                "tok",
                Some("u1"),
            )
            .await
            .unwrap();

        assert_eq!(out[0].is_favorite, Some(true));
        assert_eq!(out[0].rating, Some(9));
        assert_eq!(out[0].comment.as_deref(), Some("love it"));
        assert_eq!(out[0].favorite_id.as_deref(), Some(favorite.id.as_str()));
        assert!(out[0].purchase_id.is_some());

        assert_eq!(out[1].is_favorite, None);
        assert_eq!(out[1].favorite_id, None);
    }

    #[tokio::test]
    async fn test_cross_reference_is_per_user() {
        let (db, _dir) = test_backend().await;
        db.create_favorite(&FavoriteRecord::new("u2".to_string(), "MLA1".to_string()))
            .await
            .unwrap();
        let catalogue = Arc::new(FakeCatalogue::with(vec![product("MLA1", "One")]));
        let engine = engine(db, &catalogue);

        let out = engine
            .hydrate(vec![purchase("u1", "MLA1")], "tok", Some("u1"))
            .await
            .unwrap();
        assert_eq!(out[0].is_favorite, None);
    }

    #[tokio::test]
    async fn test_favorite_records_hydrate_without_cross_reference() {
        let (db, _dir) = test_backend().await;
        let favorite = FavoriteRecord {
            rating: Some(5),
            ..FavoriteRecord::new("u1".to_string(), "MLA1".to_string())
        };
        db.create_favorite(&favorite).await.unwrap();

        let catalogue = Arc::new(FakeCatalogue::with(vec![ProductSnapshot {
            id: "MLA1".to_string(),
            title: "Monitor".to_string(),
            price: 500.0,
            pictures: vec![Picture {
                id: "pic1".to_string(),
                url: "http://x/1.jpg".to_string(),
            }],
        }]));
        let engine = engine(db, &catalogue);

        let out = engine
            .hydrate(vec![SourceRecord::from(favorite.clone())], "tok", Some("u1"))
            .await
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].hydrated.title, "Monitor");
        assert_eq!(out[0].hydrated.thumbnail, "http://x/1.jpg");
        assert_eq!(out[0].favorite_id.as_deref(), Some(favorite.id.as_str()));
        assert_eq!(out[0].rating, Some(5));
        assert_eq!(out[0].is_favorite, None);
    }

    #[tokio::test]
    async fn test_hydrate_item_uses_point_lookups() {
        let (db, _dir) = test_backend().await;
        db.create_favorite(&FavoriteRecord::new("u1".to_string(), "MLA1".to_string()))
            .await
            .unwrap();
        let catalogue = Arc::new(FakeCatalogue::with(vec![product("MLA1", "One")]));
        let engine = engine(db, &catalogue);

        let item = engine.hydrate_item("MLA1", "tok", Some("u1")).await.unwrap();
        assert_eq!(item.is_favorite, Some(true));
        assert_eq!(catalogue.single_calls(), 1);
        assert_eq!(catalogue.batch_calls(), 0);

        let anonymous = engine.hydrate_item("MLA1", "tok", None).await.unwrap();
        assert_eq!(anonymous.is_favorite, None);
    }

    #[tokio::test]
    async fn test_search_hydrates_with_one_batch() {
        let (db, _dir) = test_backend().await;
        db.create_favorite(&FavoriteRecord::new("u1".to_string(), "MLA2".to_string()))
            .await
            .unwrap();
        let catalogue = Arc::new(
            FakeCatalogue::with(vec![product("MLA1", "One"), product("MLA2", "Two")])
                .with_search(vec![
                    SearchResultStub {
                        id: "MLA1".to_string(),
                        title: None,
                        price: None,
                        thumbnail: None,
                        thumbnail_id: None,
                    },
                    SearchResultStub {
                        id: "MLA2".to_string(),
                        title: None,
                        price: None,
                        thumbnail: None,
                        thumbnail_id: None,
                    },
                ]),
        );
        let engine = engine(db, &catalogue);

        let query = SearchQuery {
            q: "monitor".to_string(),
            ..SearchQuery::default()
        };
        let page = engine.search(&query, "tok", Some("u1")).await.unwrap();

        assert_eq!(page.paging.total, 2);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].is_favorite, None);
        assert_eq!(page.results[1].is_favorite, Some(true));
        assert_eq!(catalogue.batch_calls(), 1);
        assert_eq!(catalogue.single_calls(), 0);
    }
}
