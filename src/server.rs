//! Process wiring: tracing, pool construction, router, graceful shutdown.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::app_state::AppState;
use crate::config::{LogFormat, ServiceConfig};
use crate::domain::Entity;
use crate::persistence::{ConnectionPool, SqlConnector, schema};

/// Builds the full application router with middleware and state applied.
pub fn build_app(state: AppState) -> Router {
    api::build_router(state.entity())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Runs the service for `entity` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if configuration is invalid, schema bootstrap fails,
/// or the listener cannot be bound.
pub async fn run(entity: Entity) -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(
        service = entity.service_name(),
        addr = %config.listen_addr,
        max_connections = config.database_max_connections,
        "starting service"
    );

    // Build persistence layer
    let connector = SqlConnector::new(config.database_url.clone())?;
    let dialect = connector.dialect();
    let pool = ConnectionPool::new(Arc::new(connector), config.pool_options());

    if config.database_bootstrap_schema {
        schema::bootstrap(&pool, dialect, entity).await?;
    }

    let app = build_app(AppState::new(pool.clone(), entity));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
