mod config;
mod db;
mod document;
mod errors;
mod layout;
mod models;
mod render;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::layout::default_page_config;
use crate::render::{ExportGate, Exporter, Rasterizer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::expiry::spawn_sweeper;
use crate::store::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Forge API v{}", env!("CARGO_PKG_VERSION"));

    // Document store: PostgreSQL when configured, in-memory otherwise
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgDocumentStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; documents are kept in memory and lost on restart");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    // Expire downloaded documents after the configured TTL
    spawn_sweeper(
        store.clone(),
        chrono::Duration::hours(config.document_ttl_hours),
        Duration::from_secs(config.expiry_sweep_secs),
    );
    info!(
        ttl_hours = config.document_ttl_hours,
        every_secs = config.expiry_sweep_secs,
        "Expiry sweeper started"
    );

    // Export pipeline: A4 pages, raster magnification and page cap from config
    let exporter = Arc::new(Exporter::new(
        Rasterizer::load(&config),
        default_page_config(),
        config.max_export_pages,
    ));
    if !exporter.is_available() {
        warn!("Exports will return 204 until a TrueType font is available (set FONT_PATH)");
    }

    let state = AppState {
        store,
        config: config.clone(),
        exporter,
        export_gate: ExportGate::default(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
