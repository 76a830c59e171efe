//! Application initialization: storage, state, and routes.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use samplegate_core::Config;
use samplegate_storage::create_storage;
use std::sync::Arc;

/// Initialize the application: storage backend, shared state, and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router)> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(&config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Storage abstraction initialized successfully"
    );

    let state = Arc::new(AppState::new(storage, config.clone()));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
