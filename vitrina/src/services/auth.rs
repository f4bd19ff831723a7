use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::db::DatabaseBackend;
use crate::error::{Result, VitrinaError};
use crate::marketplace::MarketplaceClient;
use crate::models::{Session, User, UserUpdate, BUYER_ROLE};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    validate_password(password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| VitrinaError::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, phc: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| VitrinaError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VitrinaError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// Empty means the default buyer role.
    pub role_ids: Vec<String>,
}

/// Account management, login sessions and marketplace credentials.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<dyn DatabaseBackend>,
    marketplace: MarketplaceClient,
    session_ttl_secs: u64,
}

impl AuthService {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        marketplace: MarketplaceClient,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            db,
            marketplace,
            session_ttl_secs,
        }
    }

    /// Verify credentials and open a session holding a fresh marketplace token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Session, User)> {
        let invalid = || VitrinaError::Unauthorized("Invalid email or password".to_string());

        let user = self.db.get_user_by_email(email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let access_token = self.marketplace.refresh_access_token().await?;
        let session = Session::new(user.id.clone(), access_token, self.session_ttl_secs);
        self.db.create_session(&session).await?;

        info!(user_id = %user.id, "User logged in");
        Ok((session, user))
    }

    /// Resolve a bearer token to a live session. Expired sessions are removed.
    pub async fn authenticate(&self, token: &str) -> Result<Session> {
        let session = self
            .db
            .get_session(token)
            .await?
            .ok_or_else(|| VitrinaError::Unauthorized("Invalid session".to_string()))?;

        if session.is_expired(Utc::now()) {
            debug!(user_id = %session.user_id, "Rejecting expired session");
            self.db.delete_session(token).await?;
            return Err(VitrinaError::Unauthorized("Session expired".to_string()));
        }

        Ok(session)
    }

    /// Replace the session's marketplace token and return the new one.
    pub async fn refresh(&self, token: &str) -> Result<String> {
        let access_token = self.marketplace.refresh_access_token().await?;
        if !self
            .db
            .update_session_access_token(token, &access_token)
            .await?
        {
            return Err(VitrinaError::Unauthorized("Invalid session".to_string()));
        }
        Ok(access_token)
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.db.delete_session(token).await?;
        Ok(())
    }

    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        let role_ids = if input.role_ids.is_empty() {
            self.db
                .get_role_by_name(BUYER_ROLE)
                .await?
                .map(|role| vec![role.id])
                .unwrap_or_default()
        } else {
            input.role_ids
        };

        let now = Utc::now();
        let user = User {
            id: nanoid::nanoid!(),
            name: input.name,
            surname: input.surname,
            username: input.username,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.create_user(&user, &role_ids).await?;

        self.db
            .get_user(&user.id)
            .await?
            .ok_or_else(|| VitrinaError::Internal("User vanished after insert".to_string()))
    }

    /// Apply `update`, hashing `password` when present.
    pub async fn update_user(
        &self,
        id: &str,
        mut update: UserUpdate,
        password: Option<&str>,
    ) -> Result<User> {
        if let Some(password) = password {
            update.password_hash = Some(hash_password(password)?);
        }

        self.db
            .update_user(id, &update)
            .await?
            .ok_or_else(|| VitrinaError::NotFound(format!("User {id} not found")))
    }
}
