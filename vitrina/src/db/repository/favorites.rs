use libsql::{params, Connection};

use super::{
    conflict_on_unique, fill_groups, format_timestamp, parse_timestamp, placeholders,
    ranked_groups, stored_rating, text_values,
};
use crate::error::Result;
use crate::models::{FavoriteRecord, FavoriteUpdate, RecordGroup, SortOrder};

const COLUMNS: &str = "id, user_id, item_id, rating, comment, created_at";

pub struct FavoriteRepository;

impl FavoriteRepository {
    pub async fn create(conn: &Connection, favorite: &FavoriteRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO favorites (id, user_id, item_id, rating, comment, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                favorite.id.clone(),
                favorite.user_id.clone(),
                favorite.item_id.clone(),
                favorite.rating.map(i64::from),
                favorite.comment.clone(),
                format_timestamp(&favorite.created_at),
            ],
        )
        .await
        .map_err(|e| conflict_on_unique(e, "Favorite for this user and item"))?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<FavoriteRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM favorites WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_favorite(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_by_user(
        conn: &Connection,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<FavoriteRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM favorites WHERE user_id = ?1 ORDER BY created_at {}, id",
            order.as_sql()
        );
        let mut rows = conn.query(&sql, params![user_id]).await?;
        Self::collect(&mut rows).await
    }

    /// Apply a partial update and return the updated record.
    pub async fn update(
        conn: &Connection,
        id: &str,
        update: &FavoriteUpdate,
    ) -> Result<Option<FavoriteRecord>> {
        let affected = conn
            .execute(
                r#"
                UPDATE favorites SET
                    rating = COALESCE(?2, rating),
                    comment = COALESCE(?3, comment)
                WHERE id = ?1
                "#,
                params![id, update.rating.map(i64::from), update.comment.clone()],
            )
            .await?;

        if affected == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id).await
    }

    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM favorites WHERE id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    pub async fn find_by_user_and_item(
        conn: &Connection,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<FavoriteRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM favorites WHERE user_id = ?1 AND item_id = ?2");
        let mut rows = conn.query(&sql, params![user_id, item_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_favorite(&row)?))
        } else {
            Ok(None)
        }
    }

    /// The user's favorites among `item_ids`, in one query.
    pub async fn find_by_user_and_items(
        conn: &Connection,
        user_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<FavoriteRecord>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM favorites WHERE user_id = ?1 AND item_id IN ({})",
            placeholders(2, item_ids.len())
        );
        let mut values = vec![libsql::Value::from(user_id.to_string())];
        values.extend(text_values(item_ids));

        let mut rows = conn.query(&sql, libsql::params_from_iter(values)).await?;
        Self::collect(&mut rows).await
    }

    /// Favorites grouped by item, most favorited first.
    ///
    /// Equal counts rank by the group's earliest favorite. Items inside a group
    /// are ordered by creation time ascending.
    pub async fn aggregate_by_item(
        conn: &Connection,
        limit: u32,
    ) -> Result<Vec<RecordGroup<FavoriteRecord>>> {
        let mut groups = ranked_groups(
            conn,
            r#"
            SELECT item_id, COUNT(*) AS total FROM favorites
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

        let keys: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
        let sql = format!(
            "SELECT {COLUMNS} FROM favorites WHERE item_id IN ({}) ORDER BY created_at ASC, id",
            placeholders(1, keys.len())
        );
        let mut rows = conn
            .query(&sql, libsql::params_from_iter(text_values(&keys)))
            .await?;
        let records = Self::collect(&mut rows).await?;

        fill_groups(&mut groups, records, |f| f.item_id.as_str());
        Ok(groups)
    }

    async fn collect(rows: &mut libsql::Rows) -> Result<Vec<FavoriteRecord>> {
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_favorite(&row)?);
        }
        Ok(results)
    }

    fn row_to_favorite(row: &libsql::Row) -> Result<FavoriteRecord> {
        Ok(FavoriteRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            item_id: row.get(2)?,
            rating: row.get::<Option<i64>>(3)?.map(stored_rating).transpose()?,
            comment: row.get(4)?,
            created_at: parse_timestamp(&row.get::<String>(5)?),
        })
    }
}
