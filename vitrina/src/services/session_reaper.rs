use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::db::DatabaseBackend;
use crate::error::Result;

/// Periodically deletes expired login sessions.
#[derive(Clone)]
pub struct SessionReaper {
    db: Arc<dyn DatabaseBackend>,
    interval_secs: u64,
}

impl SessionReaper {
    pub fn new(db: Arc<dyn DatabaseBackend>, interval_secs: u64) -> Self {
        Self { db, interval_secs }
    }

    /// Run a single pass. Returns the number of sessions removed.
    pub async fn run_once(&self) -> Result<u64> {
        let removed = self.db.delete_expired_sessions(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        } else {
            debug!("No expired sessions to purge");
        }
        Ok(removed)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}
