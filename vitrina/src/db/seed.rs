//! Default roles, permissions and the bootstrap admin account.

use chrono::Utc;

use crate::config::AuthConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::{Permission, Role, User, ADMIN_ROLE, BUYER_ROLE};
use crate::services::hash_password;

const PERMISSIONS: [(&str, &str); 3] = [
    ("admin", "Manage users, roles and permissions"),
    ("comment", "Comment on favorites"),
    ("rate", "Rate favorites"),
];

/// Insert the default permissions and roles when the permission table is empty,
/// then make sure the configured admin account exists.
pub async fn seed(db: &dyn DatabaseBackend, auth: &AuthConfig) -> Result<()> {
    if db.count_permissions().await? == 0 {
        let mut ids = std::collections::HashMap::new();
        for (name, description) in PERMISSIONS {
            let permission = Permission::new(name, Some(description.to_string()));
            db.create_permission(&permission).await?;
            ids.insert(name, permission.id);
        }

        let grants = [
            (ADMIN_ROLE, vec!["admin"]),
            (BUYER_ROLE, vec!["comment", "rate"]),
        ];
        for (role_name, permission_names) in grants {
            let permission_ids: Vec<String> = permission_names
                .iter()
                .filter_map(|name| ids.get(name).cloned())
                .collect();
            db.create_role(&Role::new(role_name, None), &permission_ids)
                .await?;
        }

        tracing::info!("Seeded default roles and permissions");
    }

    let (Some(email), Some(password)) = (
        auth.admin_email.as_deref(),
        auth.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if db.get_user_by_email(email).await?.is_some() {
        return Ok(());
    }

    let Some(admin_role) = db.get_role_by_name(ADMIN_ROLE).await? else {
        tracing::warn!("Admin role missing; skipping admin account");
        return Ok(());
    };

    let now = Utc::now();
    let username = email.split('@').next().unwrap_or(email).to_string();
    let admin = User {
        id: nanoid::nanoid!(),
        name: "Admin".to_string(),
        surname: "Vitrina".to_string(),
        username,
        email: email.to_string(),
        password_hash: hash_password(password)?,
        roles: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    db.create_user(&admin, &[admin_role.id]).await?;
    tracing::info!(email = %email, "Created admin account");

    Ok(())
}
