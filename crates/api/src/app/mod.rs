//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use stockflow_infra::{
    AppConfig, InMemoryInventoryStore, InventoryService, InventoryStore, SqliteInventoryStore,
    StoreBackend,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(service: InventoryService) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(service)),
        )
}

/// Open the configured store and wrap it in the service.
pub async fn build_service(config: &AppConfig) -> anyhow::Result<InventoryService> {
    let store: Arc<dyn InventoryStore> = match &config.store {
        StoreBackend::InMemory => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            Arc::new(InMemoryInventoryStore::new())
        }
        StoreBackend::Sqlite { url, max_connections } => {
            let store = SqliteInventoryStore::connect(url, *max_connections)
                .await
                .with_context(|| format!("failed to open sqlite store at {url}"))?;
            tracing::info!(%url, "sqlite store ready");
            Arc::new(store)
        }
    };

    Ok(InventoryService::new(store))
}
