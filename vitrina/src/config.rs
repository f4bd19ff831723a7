use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a comma-separated env var into a list, dropping empty entries.
fn parse_env_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub marketplace: MarketplaceConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "file:vitrina.db".to_string(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
        }
    }
}

/// Connection settings for the marketplace product API.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    pub base_url: String,
    pub site_id: String,
    pub timeout_secs: u64,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Static access token; when set, token refresh never calls upstream.
    pub access_token: Option<String>,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mercadolibre.com".to_string(),
            site_id: "MLA".to_string(),
            timeout_secs: 10,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub session_ttl_secs: u64,
    pub session_purge_interval_secs: u64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 4 * 60 * 60,
            session_purge_interval_secs: 15 * 60,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let marketplace_defaults = MarketplaceConfig::default();
        let auth_defaults = AuthConfig::default();
        let database_defaults = DatabaseConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("VITRINA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("VITRINA_PORT", 3000),
                cors_allowed_origins: parse_env_list("CORS_ALLOWED_ORIGINS"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(database_defaults.url),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or(
                    "DATABASE_BUSY_TIMEOUT_MS",
                    database_defaults.busy_timeout_ms,
                ),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or(database_defaults.journal_mode),
            },
            marketplace: MarketplaceConfig {
                base_url: env::var("MARKETPLACE_BASE_URL")
                    .unwrap_or(marketplace_defaults.base_url),
                site_id: env::var("MARKETPLACE_SITE_ID").unwrap_or(marketplace_defaults.site_id),
                timeout_secs: parse_env_or("MARKETPLACE_TIMEOUT", marketplace_defaults.timeout_secs),
                client_id: parse_env_opt("MARKETPLACE_CLIENT_ID"),
                client_secret: parse_env_opt("MARKETPLACE_CLIENT_SECRET"),
                refresh_token: parse_env_opt("MARKETPLACE_REFRESH_TOKEN"),
                access_token: parse_env_opt("MARKETPLACE_ACCESS_TOKEN"),
            },
            auth: AuthConfig {
                session_ttl_secs: parse_env_or("SESSION_TTL_SECS", auth_defaults.session_ttl_secs),
                session_purge_interval_secs: parse_env_or(
                    "SESSION_PURGE_INTERVAL_SECS",
                    auth_defaults.session_purge_interval_secs,
                ),
                admin_email: parse_env_opt("VITRINA_ADMIN_EMAIL"),
                admin_password: parse_env_opt("VITRINA_ADMIN_PASSWORD"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
