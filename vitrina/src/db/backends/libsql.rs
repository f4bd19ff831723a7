use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::Database;
use crate::db::repository::{
    AccessRepository, FavoriteRepository, PurchaseRepository, SessionRepository, UserRepository,
};
use crate::db::traits::{
    AccessStore, DatabaseBackend, FavoriteStore, PurchaseStore, SessionStore, UserStore,
};
use crate::error::Result;
use crate::models::{
    FavoriteRecord, FavoriteUpdate, Permission, PurchaseRecord, RecordGroup, Role, Session,
    SortOrder, User, UserProfile, UserSummary, UserUpdate,
};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteStore for LibSqlBackend {
    async fn create_favorite(&self, favorite: &FavoriteRecord) -> Result<()> {
        let conn = self.db.connect()?;
        FavoriteRepository::create(&conn, favorite).await
    }
    async fn get_favorite(&self, id: &str) -> Result<Option<FavoriteRecord>> {
        let conn = self.db.connect()?;
        FavoriteRepository::get_by_id(&conn, id).await
    }
    async fn list_favorites_by_user(
        &self,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<FavoriteRecord>> {
        let conn = self.db.connect()?;
        FavoriteRepository::list_by_user(&conn, user_id, order).await
    }
    async fn update_favorite(
        &self,
        id: &str,
        update: &FavoriteUpdate,
    ) -> Result<Option<FavoriteRecord>> {
        let conn = self.db.connect()?;
        FavoriteRepository::update(&conn, id, update).await
    }
    async fn delete_favorite(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        FavoriteRepository::delete(&conn, id).await
    }
    async fn find_favorite(&self, user_id: &str, item_id: &str) -> Result<Option<FavoriteRecord>> {
        let conn = self.db.connect()?;
        FavoriteRepository::find_by_user_and_item(&conn, user_id, item_id).await
    }
    async fn find_favorites_for_items(
        &self,
        user_id: &str,
        item_ids: &[String],
    ) -> Result<Vec<FavoriteRecord>> {
        let conn = self.db.connect()?;
        FavoriteRepository::find_by_user_and_items(&conn, user_id, item_ids).await
    }
    async fn aggregate_favorites_by_item(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<FavoriteRecord>>> {
        let conn = self.db.connect()?;
        FavoriteRepository::aggregate_by_item(&conn, limit).await
    }
}

#[async_trait]
impl PurchaseStore for LibSqlBackend {
    async fn create_purchase(&self, purchase: &PurchaseRecord) -> Result<()> {
        let conn = self.db.connect()?;
        PurchaseRepository::create(&conn, purchase).await
    }
    async fn get_purchase(&self, id: &str) -> Result<Option<PurchaseRecord>> {
        let conn = self.db.connect()?;
        PurchaseRepository::get_by_id(&conn, id).await
    }
    async fn list_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let conn = self.db.connect()?;
        PurchaseRepository::list_all(&conn).await
    }
    async fn list_purchases_by_user(
        &self,
        user_id: &str,
        order: SortOrder,
    ) -> Result<Vec<PurchaseRecord>> {
        let conn = self.db.connect()?;
        PurchaseRepository::list_by_user(&conn, user_id, order).await
    }
    async fn delete_purchase(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        PurchaseRepository::delete(&conn, id).await
    }
    async fn aggregate_purchases_by_item(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>> {
        let conn = self.db.connect()?;
        PurchaseRepository::aggregate_by_item(&conn, limit).await
    }
    async fn aggregate_purchases_by_user(
        &self,
        limit: u32,
    ) -> Result<Vec<RecordGroup<PurchaseRecord>>> {
        let conn = self.db.connect()?;
        PurchaseRepository::aggregate_by_user(&conn, limit).await
    }
}

#[async_trait]
impl UserStore for LibSqlBackend {
    async fn create_user(&self, user: &User, role_ids: &[String]) -> Result<()> {
        let conn = self.db.connect()?;
        UserRepository::create(&conn, user, role_ids).await
    }
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.db.connect()?;
        UserRepository::get_by_id(&conn, id).await
    }
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.connect()?;
        UserRepository::get_by_email(&conn, email).await
    }
    async fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.db.connect()?;
        UserRepository::list(&conn).await
    }
    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<Option<User>> {
        let conn = self.db.connect()?;
        UserRepository::update(&conn, id, update).await
    }
    async fn delete_user(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        UserRepository::delete(&conn, id).await
    }
    async fn get_user_summaries(&self, ids: &[String]) -> Result<Vec<UserSummary>> {
        let conn = self.db.connect()?;
        UserRepository::get_summaries(&conn, ids).await
    }
    async fn get_user_profile(&self, id: &str) -> Result<Option<UserProfile>> {
        let conn = self.db.connect()?;
        UserRepository::get_profile(&conn, id).await
    }
    async fn user_has_role(&self, user_id: &str, role_name: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        UserRepository::has_role(&conn, user_id, role_name).await
    }
}

#[async_trait]
impl AccessStore for LibSqlBackend {
    async fn create_permission(&self, permission: &Permission) -> Result<()> {
        let conn = self.db.connect()?;
        AccessRepository::create_permission(&conn, permission).await
    }
    async fn get_permission(&self, id: &str) -> Result<Option<Permission>> {
        let conn = self.db.connect()?;
        AccessRepository::get_permission(&conn, id).await
    }
    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let conn = self.db.connect()?;
        AccessRepository::list_permissions(&conn).await
    }
    async fn count_permissions(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        AccessRepository::count_permissions(&conn).await
    }
    async fn delete_permission(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        AccessRepository::delete_permission(&conn, id).await
    }
    async fn create_role(&self, role: &Role, permission_ids: &[String]) -> Result<()> {
        let conn = self.db.connect()?;
        AccessRepository::create_role(&conn, role, permission_ids).await
    }
    async fn get_role(&self, id: &str) -> Result<Option<Role>> {
        let conn = self.db.connect()?;
        AccessRepository::get_role(&conn, id).await
    }
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let conn = self.db.connect()?;
        AccessRepository::get_role_by_name(&conn, name).await
    }
    async fn list_roles(&self) -> Result<Vec<Role>> {
        let conn = self.db.connect()?;
        AccessRepository::list_roles(&conn).await
    }
    async fn delete_role(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        AccessRepository::delete_role(&conn, id).await
    }
}

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let conn = self.db.connect()?;
        SessionRepository::create(&conn, session).await
    }
    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.db.connect()?;
        SessionRepository::get(&conn, token).await
    }
    async fn update_session_access_token(&self, token: &str, access_token: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        SessionRepository::update_access_token(&conn, token, access_token).await
    }
    async fn delete_session(&self, token: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        SessionRepository::delete(&conn, token).await
    }
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let conn = self.db.connect()?;
        SessionRepository::delete_expired(&conn, now).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
