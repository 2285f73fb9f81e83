mod config;
mod db;
mod errors;
mod lifecycle;
mod matching;
mod models;
mod notify;
mod oracle;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::lifecycle::store::PgMatchStore;
use crate::notify::LogNotifier;
use crate::oracle::OracleClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting match engine API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&db).await?;

    // Initialize the scoring oracle client
    let oracle = OracleClient::new(config.anthropic_api_key.clone());
    info!("Oracle client initialized (model: {})", oracle::MODEL);

    let oracle_permits = Arc::new(Semaphore::new(config.oracle_max_in_flight));
    info!(
        "Oracle concurrency cap: {} in-flight calls",
        config.oracle_max_in_flight
    );

    // Build app state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        oracle: Arc::new(oracle),
        store: Arc::new(PgMatchStore::new(db)),
        notifier: Arc::new(LogNotifier),
        oracle_permits,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
