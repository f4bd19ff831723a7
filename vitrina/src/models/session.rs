use chrono::{DateTime, Duration, Utc};

/// A login session. `token` is what clients send as their bearer credential;
/// `access_token` is the marketplace credential used for product lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: String, access_token: String, ttl_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            token: nanoid::nanoid!(32),
            user_id,
            access_token,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
