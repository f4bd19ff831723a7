use chrono::Utc;
use libsql::{params, Connection};

use super::{conflict_on_unique, format_timestamp, parse_timestamp, placeholders, text_values};
use crate::error::{Result, VitrinaError};
use crate::models::{User, UserProfile, UserSummary, UserUpdate};

const COLUMNS: &str = "id, name, surname, username, email, password_hash, created_at, updated_at";

pub struct UserRepository;

impl UserRepository {
    pub async fn create(conn: &Connection, user: &User, role_ids: &[String]) -> Result<()> {
        ensure_roles_exist(conn, role_ids).await?;

        conn.execute(
            r#"
            INSERT INTO users (id, name, surname, username, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user.id.clone(),
                user.name.clone(),
                user.surname.clone(),
                user.username.clone(),
                user.email.clone(),
                user.password_hash.clone(),
                format_timestamp(&user.created_at),
                format_timestamp(&user.updated_at),
            ],
        )
        .await
        .map_err(|e| conflict_on_unique(e, "User with this email or username"))?;

        Self::set_roles(conn, &user.id, role_ids).await
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        match rows.next().await? {
            Some(row) => {
                let mut user = Self::row_to_user(&row)?;
                user.roles = Self::role_names(conn, &user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub async fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE");
        let mut rows = conn.query(&sql, params![email]).await?;

        match rows.next().await? {
            Some(row) => {
                let mut user = Self::row_to_user(&row)?;
                user.roles = Self::role_names(conn, &user.id).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users ORDER BY created_at ASC, id");
        let mut rows = conn.query(&sql, ()).await?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(Self::row_to_user(&row)?);
        }
        for user in &mut users {
            user.roles = Self::role_names(conn, &user.id).await?;
        }
        Ok(users)
    }

    pub async fn update(conn: &Connection, id: &str, update: &UserUpdate) -> Result<Option<User>> {
        if let Some(ref role_ids) = update.role_ids {
            ensure_roles_exist(conn, role_ids).await?;
        }

        let affected = conn
            .execute(
                r#"
                UPDATE users SET
                    name = COALESCE(?2, name),
                    surname = COALESCE(?3, surname),
                    username = COALESCE(?4, username),
                    email = COALESCE(?5, email),
                    password_hash = COALESCE(?6, password_hash),
                    updated_at = ?7
                WHERE id = ?1
                "#,
                params![
                    id,
                    update.name.clone(),
                    update.surname.clone(),
                    update.username.clone(),
                    update.email.clone(),
                    update.password_hash.clone(),
                    format_timestamp(&Utc::now()),
                ],
            )
            .await
            .map_err(|e| conflict_on_unique(e, "User with this email or username"))?;

        if affected == 0 {
            return Ok(None);
        }

        if let Some(ref role_ids) = update.role_ids {
            conn.execute("DELETE FROM user_roles WHERE user_id = ?1", params![id])
                .await?;
            Self::set_roles(conn, id, role_ids).await?;
        }

        Self::get_by_id(conn, id).await
    }

    /// Delete a user together with their roles, sessions, favorites and purchases.
    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .await?;
        if affected == 0 {
            return Ok(false);
        }

        for table in ["user_roles", "sessions", "favorites", "purchases"] {
            let sql = format!("DELETE FROM {table} WHERE user_id = ?1");
            conn.execute(&sql, params![id]).await?;
        }
        Ok(true)
    }

    pub async fn get_summaries(conn: &Connection, ids: &[String]) -> Result<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, name, surname, username, email FROM users WHERE id IN ({})",
            placeholders(1, ids.len())
        );
        let mut rows = conn
            .query(&sql, libsql::params_from_iter(text_values(ids)))
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(UserSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                surname: row.get(2)?,
                username: row.get(3)?,
                email: row.get(4)?,
            });
        }
        Ok(results)
    }

    pub async fn get_profile(conn: &Connection, id: &str) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(UserProfile::from(Self::row_to_user(&row)?))),
            None => Ok(None),
        }
    }

    pub async fn has_role(conn: &Connection, user_id: &str, role_name: &str) -> Result<bool> {
        let mut rows = conn
            .query(
                r#"
                SELECT 1 FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = ?1 AND r.name = ?2
                LIMIT 1
                "#,
                params![user_id, role_name],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    async fn set_roles(conn: &Connection, user_id: &str, role_ids: &[String]) -> Result<()> {
        for role_id in role_ids {
            conn.execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
                params![user_id, role_id.clone()],
            )
            .await?;
        }
        Ok(())
    }

    async fn role_names(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
        let mut rows = conn
            .query(
                r#"
                SELECT r.name FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = ?1
                ORDER BY r.name
                "#,
                params![user_id],
            )
            .await?;

        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    fn row_to_user(row: &libsql::Row) -> Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            surname: row.get(2)?,
            username: row.get(3)?,
            email: row.get(4)?,
            password_hash: row.get(5)?,
            roles: Vec::new(),
            created_at: parse_timestamp(&row.get::<String>(6)?),
            updated_at: parse_timestamp(&row.get::<String>(7)?),
        })
    }
}

async fn ensure_roles_exist(conn: &Connection, role_ids: &[String]) -> Result<()> {
    for role_id in role_ids {
        let mut rows = conn
            .query("SELECT 1 FROM roles WHERE id = ?1", params![role_id.clone()])
            .await?;
        if rows.next().await?.is_none() {
            return Err(VitrinaError::Validation(format!("Unknown role: {role_id}")));
        }
    }
    Ok(())
}
