use libsql::{params, Connection};

use super::{
    fill_groups, format_timestamp, parse_timestamp, placeholders, ranked_groups, stored_quantity,
    text_values,
};
use crate::error::Result;
use crate::models::{PurchaseRecord, RecordGroup, SortOrder};

const COLUMNS: &str = "id, user_id, item_id, price, quantity, created_at";

pub struct PurchaseRepository;

impl PurchaseRepository {
    pub async fn create(conn: &Connection, purchase: &PurchaseRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO purchases (id, user_id, item_id, price, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                purchase.id.clone(),
                purchase.user_id.clone(),
                purchase.item_id.clone(),
                purchase.price,
                i64::from(purchase.quantity),
                format_timestamp(&purchase.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<PurchaseRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM purchases WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_purchase(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_all(conn: &Connection) -> Result<Vec<PurchaseRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM purchases ORDER BY created_at ASC, id");
        let mut rows = conn.query(&sql, ()).await?;
        Self::collect(&mut rows).await
    }

    pub async fn list_by_user(
        conn: &Connection,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<PurchaseRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM purchases WHERE user_id = ?1 ORDER BY created_at {}, id",
            order.as_sql()
        );
        let mut rows = conn.query(&sql, params![user_id]).await?;
        Self::collect(&mut rows).await
    }

    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM purchases WHERE id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    /// Purchases grouped by item, best sellers first. Items ascend by date.
    pub async fn aggregate_by_item(
        conn: &Connection,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>> {
        let mut groups = ranked_groups(
            conn,
            r#"
            SELECT item_id, COUNT(*) AS total FROM purchases
            GROUP BY item_id
            ORDER BY total DESC, MIN(created_at) ASC, item_id ASC
            LIMIT ?1
            "#,
            limit,
        )
        .await?;

        if groups.is_empty() {
            return Ok(groups);
        }

        let records = Self::list_in(conn, "item_id", &groups, SortOrder::Ascending).await?;
        fill_groups(&mut groups, records, |p| p.item_id.as_str());
        Ok(groups)
    }

    /// Purchases grouped by buyer, most active first. Each group's items are
    /// newest first, so `items[0]` is the buyer's latest purchase.
    pub async fn aggregate_by_user(
        conn: &Connection,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>> {
        let mut groups = ranked_groups(
            conn,
            r#"
            SELECT user_id, COUNT(*) AS total FROM purchases
            GROUP BY user_id
            ORDER BY total DESC, MIN(created_at) ASC, user_id ASC
            LIMIT ?1
            "#,
            limit,
        )
        .await?;

        if groups.is_empty() {
            return Ok(groups);
        }

        let records = Self::list_in(conn, "user_id", &groups, SortOrder::Descending).await?;
        fill_groups(&mut groups, records, |p| p.user_id.as_str());
        Ok(groups)
    }

    async fn list_in(
        conn: &Connection,
        column: &str,
        groups: &[RecordGroup<PurchaseRecord>],
        order: SortOrder,
    ) -> Result<Vec<PurchaseRecord>> {
        let keys: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let sql = format!(
            "SELECT {COLUMNS} FROM purchases WHERE {column} IN ({}) ORDER BY created_at {}, id",
            placeholders(1, keys.len()),
            order.as_sql()
        );
        let mut rows = conn
            .query(&sql, libsql::params_from_iter(text_values(&keys)))
            .await?;
        Self::collect(&mut rows).await
    }

    async fn collect(rows: &mut libsql::Rows) -> Result<Vec<PurchaseRecord>> {
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_purchase(&row)?);
        }
        Ok(results)
    }

    fn row_to_purchase(row: &libsql::Row) -> Result<PurchaseRecord> {
        Ok(PurchaseRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            item_id: row.get(2)?,
            price: row.get(3)?,
            quantity: stored_quantity(row.get::<i64>(4)?)?,
            created_at: parse_timestamp(&row.get::<String>(5)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use chrono::{Duration, Utc};

    async fn setup_test_db() -> Connection {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap();
        let conn = db.connect().unwrap();
        schema::init_schema(&conn).await.unwrap();
        conn
    }

    async fn insert(conn: &Connection, user: &str, item: &str, minute: i64) -> PurchaseRecord {
        let purchase = PurchaseRecord {
            created_at: Utc::now() - Duration::minutes(100 - minute),
            ..PurchaseRecord::new(user.to_string(), item.to_string(), 10.0, 1)
        };
        PurchaseRepository::create(conn, &purchase).await.unwrap();
        purchase
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let conn = setup_test_db().await;
        let purchase = PurchaseRecord::new("u1".to_string(), "MLA1".to_string(), 99.5, 3);
        PurchaseRepository::create(&conn, &purchase).await.unwrap();

        let got = PurchaseRepository::get_by_id(&conn, &purchase.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.price, 99.5);
        assert_eq!(got.quantity, 3);
        assert_eq!(got.item_id, "MLA1");

        assert!(PurchaseRepository::delete(&conn, &purchase.id).await.unwrap());
        assert!(PurchaseRepository::get_by_id(&conn, &purchase.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let conn = setup_test_db().await;
        let purchase = PurchaseRecord::new("u1".to_string(), "MLA1".to_string(), 1.0, 0);
        assert!(PurchaseRepository::create(&conn, &purchase).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_stored_quantity_is_an_error() {
        let conn = setup_test_db().await;
        conn.execute(
            "INSERT INTO purchases (id, user_id, item_id, price, quantity, created_at) VALUES ('p1', 'u1', 'MLA1', 1.0, 5000000000, '2024-01-01T00:00:00.000000Z')",
            (),
        )
        .await
        .unwrap();

        let err = PurchaseRepository::get_by_id(&conn, "p1").await.unwrap_err();
        assert!(matches!(err, crate::error::VitrinaError::Internal(_)));
    }

    #[tokio::test]
    async fn test_list_by_user_respects_order() {
        let conn = setup_test_db().await;
        let first = insert(&conn, "u1", "MLA1", 1).await;
        let second = insert(&conn, "u1", "MLA2", 2).await;
        insert(&conn, "u2", "MLA3", 3).await;

        let asc = PurchaseRepository::list_by_user(&conn, "u1", SortOrder::Ascending)
            .await
            .unwrap();
        let ids: Vec<&str> = asc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);

        let desc = PurchaseRepository::list_by_user(&conn, "u1", SortOrder::Descending)
            .await
            .unwrap();
        assert_eq!(desc[0].id, second.id);

        assert_eq!(PurchaseRepository::list_all(&conn).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_aggregate_by_user_latest_first() {
        let conn = setup_test_db().await;
        insert(&conn, "u1", "MLA1", 1).await;
        let latest = insert(&conn, "u1", "MLA2", 9).await;
        insert(&conn, "u1", "MLA3", 5).await;
        insert(&conn, "u2", "MLA1", 2).await;

        let groups = PurchaseRepository::aggregate_by_user(&conn, 5).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "u1");
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].items[0].id, latest.id);
        assert_eq!(groups[1].key, "u2");
    }

    #[tokio::test]
    async fn test_aggregate_by_item_limit() {
        let conn = setup_test_db().await;
        for (i, item) in ["MLA1", "MLA1", "MLA2", "MLA3", "MLA3", "MLA3"]
            .iter()
            .enumerate()
        {
            insert(&conn, "u1", item, i as i64).await;
        }

        let groups = PurchaseRepository::aggregate_by_item(&conn, 2).await.unwrap();
        let keys: Vec<(&str, u32)> = groups.iter().map(|g| (g.key.as_str(), g.count)).collect();
        assert_eq!(keys, vec![("MLA3", 3), ("MLA1", 2)]);
    }
}
