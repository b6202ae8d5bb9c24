use actix::prelude::*;
use actix_web::web;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod api;
mod config;
mod domain;
mod metrics;
mod report;
mod store;
mod utils;

use actors::HealthMonitorActor;
use api::{AppState, StaffOrReadOnly};
use config::AppConfig;
use report::PdfReportRenderer;
use store::{PgStore, Store};
use utils::{retry_on_transient, RetryConfig};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter, e.g. RUST_LOG=debug
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_desk=debug"))
        )
        .init();

    tracing::info!("🚀 Starting order desk");

    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.service_host,
        port = config.service_port,
        policy = ?config.status_policy,
        staff_tokens = config.staff_tokens.len(),
        "Configuration loaded"
    );
    if config.staff_tokens.is_empty() {
        tracing::warn!("No staff tokens configured, the API is read-only");
    }

    // === 1. Connect to PostgreSQL and apply migrations ===
    tracing::info!("Connecting to PostgreSQL...");
    let pool = retry_on_transient(RetryConfig::startup(), |attempt| {
        tracing::debug!(attempt, "Opening connection pool");
        PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
    })
    .await
    .into_result()?;

    let pg = PgStore::new(pool);
    pg.migrate().await?;
    tracing::info!("✅ Database ready");
    let store: Arc<dyn Store> = Arc::new(pg);

    // === 2. Metrics and health monitoring ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let health = HealthMonitorActor::new(store.clone(), metrics.clone(), config.health_check_interval).start();

    // === 3. HTTP API ===
    let state = web::Data::new(AppState::new(
        store,
        config.status_policy,
        config.default_shipping_cost,
        Arc::new(PdfReportRenderer),
        metrics.clone(),
    ));
    let auth = StaffOrReadOnly::new(config.staff_tokens.clone());

    futures_util::try_join!(
        api::start_api_server(state, auth, config.service_host.clone(), config.service_port),
        metrics::start_metrics_server(metrics, health, config.service_host.clone(), config.metrics_port),
    )?;

    tracing::info!("👋 Shutting down");
    Ok(())
}
