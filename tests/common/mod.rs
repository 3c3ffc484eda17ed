//! Shared helpers for the HTTP integration tests.

#![allow(dead_code, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use directory_service::app_state::AppState;
use directory_service::domain::Entity;
use directory_service::error::AcquireError;
use directory_service::persistence::{
    Connection, ConnectionPool, Connector, Dialect, PoolOptions, SqlConnector, schema,
};
use directory_service::server::build_app;
use serde_json::Value;
use tower::ServiceExt;

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A fresh shared-cache in-memory SQLite URL, unique per call.
pub fn sqlite_url(tag: &str) -> String {
    let n = NEXT_DB.fetch_add(1, Ordering::SeqCst);
    format!("sqlite:file:{tag}-{n}?mode=memory&cache=shared")
}

/// Pool over a fresh in-memory database with the entity's table created.
///
/// The bootstrap connection stays idle in the pool, which keeps the
/// in-memory database alive for the lifetime of the pool.
pub async fn sqlite_pool(entity: Entity, options: PoolOptions) -> ConnectionPool {
    let Ok(connector) = SqlConnector::new(sqlite_url(entity.service_name())) else {
        panic!("sqlite url should be accepted");
    };
    let pool = ConnectionPool::new(Arc::new(connector), options);
    let Ok(()) = schema::bootstrap(&pool, Dialect::Sqlite, entity).await else {
        panic!("schema bootstrap failed");
    };
    pool
}

/// Router plus the pool behind it, for count assertions.
pub async fn test_app(entity: Entity) -> (Router, ConnectionPool) {
    test_app_with(entity, PoolOptions::default()).await
}

/// Like [`test_app`] with explicit pool sizing.
pub async fn test_app_with(entity: Entity, options: PoolOptions) -> (Router, ConnectionPool) {
    let pool = sqlite_pool(entity, options).await;
    let app = build_app(AppState::new(pool.clone(), entity));
    (app, pool)
}

/// Sends one request through the router and decodes the body.
///
/// Bodies that are not JSON (health strings, empty 204s) come back as a
/// JSON string or `Null`.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(request) = request else {
        panic!("request should build");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Connector whose database is never reachable.
#[derive(Debug)]
pub struct RefusingConnector;

#[async_trait]
impl Connector for RefusingConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, AcquireError> {
        Err(AcquireError::Connect("connection refused".to_string()))
    }
}
