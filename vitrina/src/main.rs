use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrina::api::{create_router, AppState};
use vitrina::config::Config;
use vitrina::db::{seed, Database, DatabaseBackend, LibSqlBackend};
use vitrina::marketplace::MarketplaceClient;
use vitrina::services::SessionReaper;

#[derive(Parser)]
#[command(name = "vitrina")]
#[command(about = "Favorites and purchases backend over a live marketplace catalogue")]
struct Args {
    /// Initialise the schema and seed data, then exit
    #[arg(long)]
    seed_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrina=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    seed::seed(&*db, &config.auth).await?;
    if args.seed_only {
        tracing::info!("Seed complete, exiting");
        return Ok(());
    }

    if config.marketplace.access_token.is_none() && config.marketplace.refresh_token.is_none() {
        tracing::warn!(
            "Neither MARKETPLACE_ACCESS_TOKEN nor MARKETPLACE_REFRESH_TOKEN is set - logins will fail"
        );
    }

    let marketplace = MarketplaceClient::new(config.marketplace.clone())?;
    let state = AppState::new(config.clone(), db, marketplace);

    let cancel_token = CancellationToken::new();

    tracing::info!(
        "Starting session reaper... (interval={}s)",
        config.auth.session_purge_interval_secs
    );
    let reaper = SessionReaper::new(state.db.clone(), config.auth.session_purge_interval_secs);
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Session reaper shutting down...");
                    break;
                }
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(reaper.interval_secs())) => {
                    if let Err(e) = reaper.run_once().await {
                        tracing::error!("Session reaper error: {}", e);
                    }
                }
            }
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Vitrina starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
