use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    FavoriteRecord, FavoriteUpdate, Permission, PurchaseRecord, RecordGroup, Role, Session,
    SortOrder, User, UserProfile, UserSummary, UserUpdate,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Favorites keyed by (user, item).
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn create_favorite(&self, favorite: &FavoriteRecord) -> Result<()>;
    async fn get_favorite(&self, id: &str) -> Result<Option<FavoriteRecord>>;
    async fn list_favorites_by_user(
        &self,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<FavoriteRecord>>;
    async fn update_favorite(
        &self,
        id: &str,
        update: &FavoriteUpdate,
    ) -> Result<Option<FavoriteRecord>>;
    async fn delete_favorite(&self, id: &str) -> Result<bool>;

    /// Point lookup of a user's favorite for one item.
    async fn find_favorite(&self, user_id: &str, item_id: &str) -> Result<Option<FavoriteRecord>>;

    /// A user's favorites for any of `item_ids`, in one round trip.
    async fn find_favorites_for_items(
        &self,
        user_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<FavoriteRecord>>;

    async fn aggregate_favorites_by_item(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<FavoriteRecord>>>;
}

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn create_purchase(&self, purchase: &PurchaseRecord) -> Result<()>;
    async fn get_purchase(&self, id: &str) -> Result<Option<PurchaseRecord>>;
    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>>;
    async fn list_purchases_by_user(
        &self,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<PurchaseRecord>>;
    async fn delete_purchase(&self, id: &str) -> Result<bool>;
    async fn aggregate_purchases_by_item(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>>;

    /// Groups by buyer; each group's items are newest first.
    async fn aggregate_purchases_by_user(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: &User, role_ids: &[String]) -> Result<()>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<User>>;
    async fn delete_user(&self, id: &str) -> Result<bool>;
    async fn get_user_summaries(&self, ids: &[String]) -> Result<Vec<UserSummary>>;
    async fn get_user_profile(&self, id: &str) -> Result<Option<UserProfile>>;
    async fn user_has_role(&self, user_id: &str, role_name: &str) -> Result<bool>;
}

/// Roles and permissions.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn create_permission(&self, permission: &Permission) -> Result<()>;
    async fn get_permission(&self, id: &str) -> Result<Option<Permission>>;
    async fn list_permissions(&self) -> Result<Vec<Permission>>;
    async fn count_permissions(&self) -> Result<u64>;
    async fn delete_permission(&self, id: &str) -> Result<bool>;
    async fn create_role(&self, role: &Role, permission_ids: &[String]) -> Result<()>;
    async fn get_role(&self, id: &str) -> Result<Option<Role>>;
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    async fn list_roles(&self) -> Result<Vec<Role>>;
    async fn delete_role(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<()>;
    async fn get_session(&self, token: &str) -> Result<Option<Session>>;
    async fn update_session_access_token(&self, token: &str, access_token: &str) -> Result<bool>;
    async fn delete_session(&self, token: &str) -> Result<bool>;
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend that combines all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    FavoriteStore + PurchaseStore + UserStore + AccessStore + SessionStore
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;
}
