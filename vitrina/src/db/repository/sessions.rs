use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::error::Result;
use crate::models::Session;

pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(conn: &Connection, session: &Session) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO sessions (token, user_id, access_token, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                session.token.clone(),
                session.user_id.clone(),
                session.access_token.clone(),
                format_timestamp(&session.created_at),
                format_timestamp(&session.expires_at),
            ],
        )
        .await?;
        Ok(())
    }

    pub async fn get(conn: &Connection, token: &str) -> Result<Option<Session>> {
        let mut rows = conn
            .query(
                "SELECT token, user_id, access_token, created_at, expires_at FROM sessions WHERE token = ?1",
                params![token],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Session {
                token: row.get(0)?,
                user_id: row.get(1)?,
                access_token: row.get(2)?,
                created_at: parse_timestamp(&row.get::<String>(3)?),
                expires_at: parse_timestamp(&row.get::<String>(4)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn update_access_token(
        conn: &Connection,
        token: &str,
        access_token: &str,
    ) -> Result<bool> {
        let affected = conn
            .execute(
                "UPDATE sessions SET access_token = ?2 WHERE token = ?1",
                params![token, access_token],
            )
            .await?;
        Ok(affected > 0)
    }

    pub async fn delete(conn: &Connection, token: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])
            .await?;
        Ok(affected > 0)
    }

    pub async fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> Result<u64> {
        let affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![format_timestamp(&now)],
            )
            .await?;
        Ok(affected)
    }
}
