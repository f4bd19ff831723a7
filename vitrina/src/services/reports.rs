use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use super::hydration::{unique_ids, HydrationEngine};
use crate::db::DatabaseBackend;
use crate::error::{Result, VitrinaError};
use crate::models::{
    FavoriteGroupEntry, SourceRecord, TopFavoritedItem, TopPurchaser, TopSellingItem,
    UserSummary,
};

/// Number of groups every ranking returns.
pub const TOP_LIMIT: u32 = 5;

/// How `averageRating` is computed when only some favorites in a group are rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialRatingsPolicy {
    /// Highest rating among the rated favorites.
    MaxOfRated,
    /// Arithmetic mean of the rated favorites.
    MeanOfRated,
}

/// Partially rated groups report their best rating rather than a mean. Flip to
/// `MeanOfRated` to average the rated favorites instead.
pub const PARTIAL_RATINGS_POLICY: PartialRatingsPolicy = PartialRatingsPolicy::MaxOfRated;

/// Average rating of a favorite group.
///
/// Fully rated groups get the true mean. Partially rated groups follow
/// `policy`. A group with no ratings at all has no average.
pub fn average_rating(ratings: &[Option<u8>], policy: PartialRatingsPolicy) -> Option<f64> {
    let rated: Vec<f64> = ratings.iter().flatten().map(|r| f64::from(*r)).collect();
    if rated.is_empty() {
        return None;
    }

    let mean = rated.iter().sum::<f64>() / rated.len() as f64;
    if rated.len() == ratings.len() {
        return Some(mean);
    }

    match policy {
        PartialRatingsPolicy::MaxOfRated => rated.into_iter().reduce(f64::max),
        PartialRatingsPolicy::MeanOfRated => Some(mean),
    }
}

/// Top-five rankings over favorites and purchases, hydrated with product data.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<dyn DatabaseBackend>,
    hydration: HydrationEngine,
}

impl ReportService {
    pub fn new(db: Arc<dyn DatabaseBackend>, hydration: HydrationEngine) -> Self {
        Self { db, hydration }
    }

    /// The five most favorited items with their favorites and rating.
    pub async fn top_favorited(&self, credential: &str) -> Result<Vec<TopFavoritedItem>> {
        let groups = self.db.aggregate_favorites_by_item(TOP_LIMIT).await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let products = self.hydration.fetch_products(&item_ids, credential).await?;

        let user_ids = unique_ids(
            groups
                .iter()
                .flat_map(|g| g.items.iter().map(|f| f.user_id.as_str())),
        );
        let users: HashMap<String, UserSummary> = self
            .db
            .get_user_summaries(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        debug!(groups = groups.len(), "Building top favorited report");

        groups
            .into_iter()
            .map(|group| {
                let hydrated = products.hydrated(&group.key)?;
                let ratings: Vec<Option<u8>> = group.items.iter().map(|f| f.rating).collect();
                let items = group
                    .items
                    .into_iter()
                    .map(|f| FavoriteGroupEntry {
                        user: users.get(&f.user_id).cloned(),
                        favorite_id: f.id,
                        item_id: f.item_id,
                        rating: f.rating,
                        comment: f.comment,
                    })
                    .collect();

                Ok(TopFavoritedItem {
                    item_id: group.key,
                    count: group.count,
                    items,
                    average_rating: average_rating(&ratings, PARTIAL_RATINGS_POLICY),
                    hydrated,
                })
            })
            .collect()
    }

    /// The five items with the most purchases.
    pub async fn top_selling(&self, credential: &str) -> Result<Vec<TopSellingItem>> {
        let groups = self.db.aggregate_purchases_by_item(TOP_LIMIT).await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let products = self.hydration.fetch_products(&item_ids, credential).await?;

        groups
            .into_iter()
            .map(|group| {
                Ok(TopSellingItem {
                    hydrated: products.hydrated(&group.key)?,
                    units_sold: group.items.iter().map(|p| u64::from(p.quantity)).sum(),
                    item_id: group.key,
                    count: group.count,
                    items: group.items,
                })
            })
            .collect()
    }

    /// The five users with the most purchases, each with their latest purchase.
    pub async fn top_purchasers(&self, credential: &str) -> Result<Vec<TopPurchaser>> {
        let groups = self.db.aggregate_purchases_by_user(TOP_LIMIT).await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let db = &self.db;
        let profiles = try_join_all(groups.iter().map(|group| async move {
            db.get_user_profile(&group.key)
                .await?
                .ok_or_else(|| VitrinaError::NotFound(format!("User {} not found", group.key)))
        }))
        .await?;

        let latest = groups
            .iter()
            .map(|group| {
                group
                    .items
                    .first()
                    .cloned()
                    .map(SourceRecord::from)
                    .ok_or_else(|| {
                        VitrinaError::Internal(format!("Empty purchase group for {}", group.key))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let last_purchases = self.hydration.hydrate_many(latest, credential).await?;

        Ok(groups
            .into_iter()
            .zip(profiles)
            .zip(last_purchases)
            .map(|((group, user), last_purchase)| TopPurchaser {
                user_id: group.key,
                count: group.count,
                user,
                last_purchase,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FavoriteRecord, PurchaseRecord, User};
    use crate::services::test_support::{product, test_backend, FakeCatalogue};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn service(db: Arc<dyn DatabaseBackend>, catalogue: &Arc<FakeCatalogue>) -> ReportService {
        let hydration = HydrationEngine::new(db.clone(), catalogue.clone());
        ReportService::new(db, hydration)
    }

    async fn add_user(db: &Arc<dyn DatabaseBackend>, id: &str) {
        let now = Utc::now();
        let user = User {
            id: id.to_string(),
            name: format!("Name {id}"),
            surname: "Test".to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "x".to_string(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        db.create_user(&user, &[]).await.unwrap();
    }

    async fn add_favorite(db: &Arc<dyn DatabaseBackend>, user: &str, item: &str, rating: Option<u8>) {
        let favorite = FavoriteRecord {
            rating,
            ..FavoriteRecord::new(user.to_string(), item.to_string())
        };
        db.create_favorite(&favorite).await.unwrap();
    }

    async fn add_purchase(
        db: &Arc<dyn DatabaseBackend>,
        user: &str,
        item: &str,
        quantity: u32,
        minutes_ago: i64,
    ) -> PurchaseRecord {
        let purchase = PurchaseRecord {
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            ..PurchaseRecord::new(user.to_string(), item.to_string(), 10.0, quantity)
        };
        db.create_purchase(&purchase).await.unwrap();
        purchase
    }

    #[test]
    fn test_average_rating_full_group_is_mean() {
        let ratings = [Some(2), Some(4), Some(9)];
        assert_eq!(average_rating(&ratings, PARTIAL_RATINGS_POLICY), Some(5.0));
    }

    #[test]
    fn test_average_rating_partial_group_is_max() {
        let ratings = [Some(2), None, Some(9)];
        assert_eq!(average_rating(&ratings, PARTIAL_RATINGS_POLICY), Some(9.0));
        assert_eq!(
            average_rating(&ratings, PartialRatingsPolicy::MeanOfRated),
            Some(5.5)
        );
    }

    #[test]
    fn test_average_rating_unrated_group() {
        assert_eq!(average_rating(&[None, None], PARTIAL_RATINGS_POLICY), None);
        assert_eq!(average_rating(&[], PARTIAL_RATINGS_POLICY), None);
    }

    #[tokio::test]
    async fn test_top_favorited_cuts_at_five() {
        let (db, _dir) = test_backend().await;
        let counts = [10, 9, 8, 7, 6, 5, 4, 3];
        let mut products = Vec::new();
        for (i, count) in counts.iter().enumerate() {
            let item = format!("MLA{i}");
            products.push(product(&item, &format!("Item {i}")));
            for u in 0..*count {
                add_favorite(&db, &format!("u{u}"), &item, None).await;
            }
        }
        let catalogue = Arc::new(FakeCatalogue::with(products).reversed());
        let reports = service(db, &catalogue);

        let top = reports.top_favorited("tok").await.unwrap();
        let got: Vec<(&str, u32)> = top.iter().map(|t| (t.item_id.as_str(), t.count)).collect();
        assert_eq!(
            got,
            vec![("MLA0", 10), ("MLA1", 9), ("MLA2", 8), ("MLA3", 7), ("MLA4", 6)]
        );
        assert_eq!(top[2].hydrated.title, "Item 2");
        assert_eq!(catalogue.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_top_favorited_ratings_and_users() {
        let (db, _dir) = test_backend().await;
        for u in ["u1", "u2", "u3"] {
            add_user(&db, u).await;
        }
        add_favorite(&db, "u1", "MLA1", Some(2)).await;
        add_favorite(&db, "u2", "MLA1", Some(4)).await;
        add_favorite(&db, "u3", "MLA1", Some(9)).await;
        add_favorite(&db, "u1", "MLA2", Some(2)).await;
        add_favorite(&db, "u2", "MLA2", None).await;
        add_favorite(&db, "u3", "MLA2", Some(9)).await;

        let catalogue = Arc::new(FakeCatalogue::with(vec![
            product("MLA1", "One"),
            product("MLA2", "Two"),
        ]));
        let reports = service(db, &catalogue);

        let top = reports.top_favorited("tok").await.unwrap();
        assert_eq!(top.len(), 2);

        let full = top.iter().find(|t| t.item_id == "MLA1").unwrap();
        assert_eq!(full.average_rating, Some(5.0));
        let partial = top.iter().find(|t| t.item_id == "MLA2").unwrap();
        assert_eq!(partial.average_rating, Some(9.0));

        let user = full.items[0].user.as_ref().unwrap();
        assert_eq!(user.username, "u1");
    }

    #[tokio::test]
    async fn test_reports_on_empty_store_skip_gateway() {
        let (db, _dir) = test_backend().await;
        let catalogue = Arc::new(FakeCatalogue::with(vec![]));
        let reports = service(db, &catalogue);

        assert!(reports.top_favorited("tok").await.unwrap().is_empty());
        assert!(reports.top_selling("tok").await.unwrap().is_empty());
        assert!(reports.top_purchasers("tok").await.unwrap().is_empty());
        assert_eq!(catalogue.batch_calls(), 0);
        assert_eq!(catalogue.single_calls(), 0);
    }

    #[tokio::test]
    async fn test_top_selling_counts_units() {
        let (db, _dir) = test_backend().await;
        add_purchase(&db, "u1", "MLA1", 2, 5).await;
        add_purchase(&db, "u2", "MLA1", 3, 4).await;
        add_purchase(&db, "u1", "MLA2", 1, 3).await;

        let catalogue = Arc::new(FakeCatalogue::with(vec![
            product("MLA1", "One"),
            product("MLA2", "Two"),
        ]));
        let reports = service(db, &catalogue);

        let top = reports.top_selling("tok").await.unwrap();
        assert_eq!(top[0].item_id, "MLA1");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].units_sold, 5);
        assert_eq!(top[0].hydrated.thumbnail, "http://img/MLA1/1.jpg");
        assert_eq!(top[1].item_id, "MLA2");
    }

    #[tokio::test]
    async fn test_top_selling_units_do_not_overflow() {
        let (db, _dir) = test_backend().await;
        add_purchase(&db, "u1", "MLA1", u32::MAX, 2).await;
        add_purchase(&db, "u2", "MLA1", u32::MAX, 1).await;

        let catalogue = Arc::new(FakeCatalogue::with(vec![product("MLA1", "One")]));
        let reports = service(db, &catalogue);

        let top = reports.top_selling("tok").await.unwrap();
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].units_sold, 2 * u64::from(u32::MAX));
    }

    #[tokio::test]
    async fn test_top_selling_join_failure_aborts_report() {
        let (db, _dir) = test_backend().await;
        add_purchase(&db, "u1", "MLA1", 1, 2).await;
        add_purchase(&db, "u1", "MLA404", 1, 1).await;

        let catalogue = Arc::new(FakeCatalogue::with(vec![product("MLA1", "One")]));
        let reports = service(db, &catalogue);

        let err = reports.top_selling("tok").await.unwrap_err();
        assert!(matches!(err, VitrinaError::JoinMismatch { .. }));
    }

    #[tokio::test]
    async fn test_top_purchasers_hydrates_latest_purchase() {
        let (db, _dir) = test_backend().await;
        add_user(&db, "u1").await;
        add_user(&db, "u2").await;
        add_purchase(&db, "u1", "MLA1", 1, 30).await;
        let latest = add_purchase(&db, "u1", "MLA2", 1, 1).await;
        add_purchase(&db, "u1", "MLA1", 1, 20).await;
        add_purchase(&db, "u2", "MLA3", 1, 10).await;

        let catalogue = Arc::new(FakeCatalogue::with(vec![
            product("MLA1", "One"),
            product("MLA2", "Two"),
            product("MLA3", "Three"),
        ]));
        let reports = service(db, &catalogue);

        let top = reports.top_purchasers("tok").await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user_id, "u1");
        assert_eq!(top[0].count, 3);
        assert_eq!(top[0].user.email, "u1@example.com");
        assert_eq!(
            top[0].last_purchase.purchase_id.as_deref(),
            Some(latest.id.as_str())
        );
        assert_eq!(top[0].last_purchase.hydrated.title, "Two");
        assert_eq!(top[1].last_purchase.hydrated.title, "Three");
        assert_eq!(catalogue.batch_calls(), 1);
    }
}
