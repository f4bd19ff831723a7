use libsql::{params, Connection};

use super::{conflict_on_unique, format_timestamp, parse_timestamp};
use crate::error::{Result, VitrinaError};
use crate::models::{Permission, Role};

/// Roles, permissions and the grants between them.
pub struct AccessRepository;

impl AccessRepository {
    pub async fn create_permission(conn: &Connection, permission: &Permission) -> Result<()> {
        conn.execute(
            "INSERT INTO permissions (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                permission.id.clone(),
                permission.name.clone(),
                permission.description.clone(),
                format_timestamp(&permission.created_at),
            ],
        )
        .await
        .map_err(|e| conflict_on_unique(e, "Permission"))?;
        Ok(())
    }

    pub async fn get_permission(conn: &Connection, id: &str) -> Result<Option<Permission>> {
        let mut rows = conn
            .query(
                "SELECT id, name, description, created_at FROM permissions WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_permission(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_permissions(conn: &Connection) -> Result<Vec<Permission>> {
        let mut rows = conn
            .query(
                "SELECT id, name, description, created_at FROM permissions ORDER BY name",
                (),
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_permission(&row)?);
        }
        Ok(results)
    }

    pub async fn count_permissions(conn: &Connection) -> Result<u64> {
        let mut rows = conn.query("SELECT COUNT(*) FROM permissions", ()).await?;
        match rows.next().await? {
            Some(row) => Ok(u64::try_from(row.get::<i64>(0)?).unwrap_or(0)),
            None => Ok(0),
        }
    }

    pub async fn delete_permission(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM permissions WHERE id = ?1", params![id])
            .await?;
        conn.execute(
            "DELETE FROM role_permissions WHERE permission_id = ?1",
            params![id],
        )
        .await?;
        Ok(affected > 0)
    }

    /// Insert a role and grant it `permission_ids`. Unknown permissions are rejected.
    pub async fn create_role(
        conn: &Connection,
        role: &Role,
        permission_ids: &[String],
    ) -> Result<()> {
        for permission_id in permission_ids {
            if Self::get_permission(conn, permission_id).await?.is_none() {
                return Err(VitrinaError::Validation(format!(
                    "Unknown permission: {permission_id}"
                )));
            }
        }

        conn.execute(
            "INSERT INTO roles (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                role.id.clone(),
                role.name.clone(),
                role.description.clone(),
                format_timestamp(&role.created_at),
            ],
        )
        .await
        .map_err(|e| conflict_on_unique(e, "Role"))?;

        for permission_id in permission_ids {
            conn.execute(
                "INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?1, ?2)",
                params![role.id.clone(), permission_id.clone()],
            )
            .await?;
        }
        Ok(())
    }

    pub async fn get_role(conn: &Connection, id: &str) -> Result<Option<Role>> {
        let mut rows = conn
            .query(
                "SELECT id, name, description, created_at FROM roles WHERE id = ?1",
                params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let mut role = Self::row_to_role(&row)?;
                role.permissions = Self::role_permissions(conn, &role.id).await?;
                Ok(Some(role))
            }
            None => Ok(None),
        }
    }

    pub async fn get_role_by_name(conn: &Connection, name: &str) -> Result<Option<Role>> {
        let mut rows = conn
            .query("SELECT id FROM roles WHERE name = ?1", params![name])
            .await?;

        match rows.next().await? {
            Some(row) => Self::get_role(conn, &row.get::<String>(0)?).await,
            None => Ok(None),
        }
    }

    pub async fn list_roles(conn: &Connection) -> Result<Vec<Role>> {
        let mut rows = conn
            .query(
                "SELECT id, name, description, created_at FROM roles ORDER BY name",
                (),
            )
            .await?;

        let mut roles = Vec::new();
        while let Some(row) = rows.next().await? {
            roles.push(Self::row_to_role(&row)?);
        }
        for role in &mut roles {
            role.permissions = Self::role_permissions(conn, &role.id).await?;
        }
        Ok(roles)
    }

    pub async fn delete_role(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM roles WHERE id = ?1", params![id])
            .await?;
        conn.execute("DELETE FROM role_permissions WHERE role_id = ?1", params![id])
            .await?;
        conn.execute("DELETE FROM user_roles WHERE role_id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    async fn role_permissions(conn: &Connection, role_id: &str) -> Result<Vec<Permission>> {
        let mut rows = conn
            .query(
                r#"
                SELECT p.id, p.name, p.description, p.created_at
                FROM role_permissions rp
                JOIN permissions p ON p.id = rp.permission_id
                WHERE rp.role_id = ?1
                ORDER BY p.name
                "#,
                params![role_id],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_permission(&row)?);
        }
        Ok(results)
    }

    fn row_to_permission(row: &libsql::Row) -> Result<Permission> {
        Ok(Permission {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_timestamp(&row.get::<String>(3)?),
        })
    }

    fn row_to_role(row: &libsql::Row) -> Result<Role> {
        Ok(Role {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            permissions: Vec::new(),
            created_at: parse_timestamp(&row.get::<String>(3)?),
        })
    }
}
