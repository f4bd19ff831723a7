use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::marketplace::{MarketplaceClient, ProductLookup};
use crate::services::{AuthService, HydrationEngine, ReportService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub hydration: HydrationEngine,
    pub reports: ReportService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn DatabaseBackend>, marketplace: MarketplaceClient) -> Self {
        let config = Arc::new(config);
        let lookup: Arc<dyn ProductLookup> = Arc::new(marketplace.clone());
        let hydration = HydrationEngine::new(db.clone(), lookup);
        let reports = ReportService::new(db.clone(), hydration.clone());
        let auth = AuthService::new(db.clone(), marketplace, config.auth.session_ttl_secs);

        Self {
            config,
            db,
            hydration,
            reports,
            auth,
        }
    }
}
