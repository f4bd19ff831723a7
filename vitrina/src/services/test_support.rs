//! In-process fakes shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::db::{Database, DatabaseBackend, LibSqlBackend};
use crate::error::{Result, VitrinaError};
use crate::marketplace::ProductLookup;
use crate::models::{
    ItemEnvelope, Picture, ProductSnapshot, SearchPage, SearchPaging, SearchQuery,
    SearchResultStub,
};

pub fn product(id: &str, title: &str) -> ProductSnapshot {
    ProductSnapshot {
        id: id.to_string(),
        title: title.to_string(),
        price: 100.0,
        pictures: vec![
            Picture {
                id: format!("{id}-p1"),
                url: format!("http://img/{id}/1.jpg"),
            },
            Picture {
                id: format!("{id}-p2"),
                url: format!("http://img/{id}/2.jpg"),
            },
        ],
    }
}

pub async fn test_backend() -> (Arc<dyn DatabaseBackend>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("file:{}", dir.path().join("vitrina.db").display()),
        ..DatabaseConfig::default()
    };
    let db = Database::new(&config).await.unwrap();
    (Arc::new(LibSqlBackend::new(db)), dir)
}

/// Product catalogue that counts calls and can scramble batch order.
#[derive(Default)]
pub struct FakeCatalogue {
    products: HashMap<String, ProductSnapshot>,
    order: Vec<String>,
    reversed: bool,
    search_results: Vec<SearchResultStub>,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    last_batch: Mutex<Vec<String>>,
}

impl FakeCatalogue {
    pub fn with(products: Vec<ProductSnapshot>) -> Self {
        Self {
            order: products.iter().map(|p| p.id.clone()).collect(),
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Self::default()
        }
    }

    /// Answer batch lookups in reverse request order.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub fn with_search(mut self, results: Vec<SearchResultStub>) -> Self {
        self.search_results = results;
        self
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn last_batch(&self) -> Vec<String> {
        self.last_batch.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductLookup for FakeCatalogue {
    async fn fetch_item(&self, id: &str, _credential: &str) -> Result<ProductSnapshot> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.products
            .get(id)
            .cloned()
            .ok_or_else(|| VitrinaError::NotFound(format!("Item {id} not found")))
    }

    async fn fetch_items(&self, ids: &[String], _credential: &str) -> Result<Vec<ItemEnvelope>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_batch.lock().unwrap() = ids.to_vec();

        let mut found: Vec<ItemEnvelope> = ids
            .iter()
            .filter_map(|id| self.products.get(id).cloned())
            .map(ItemEnvelope::from)
            .collect();
        if self.reversed {
            found.reverse();
        }
        Ok(found)
    }

    async fn search(&self, _query: &SearchQuery, _credential: &str) -> Result<SearchPage> {
        let results = if self.search_results.is_empty() {
            self.order
                .iter()
                .map(|id| SearchResultStub {
                    id: id.clone(),
                    title: None,
                    price: None,
                    thumbnail: None,
                    thumbnail_id: None,
                })
                .collect()
        } else {
            self.search_results.clone()
        };

        Ok(SearchPage {
            paging: SearchPaging {
                total: results.len() as u64,
                offset: 0,
                limit: 50,
            },
            results,
        })
    }
}
