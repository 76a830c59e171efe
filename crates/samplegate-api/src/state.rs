//! Application state.
//!
//! The gateway is stateless per request; the only shared pieces are the
//! injected storage handle and the parsed configuration. Handlers receive
//! the state as `Arc<AppState>` and never mutate it.

use samplegate_core::Config;
use samplegate_storage::Storage;
use std::sync::Arc;

/// Main application state: injected collaborators for dependency injection.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Config,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: Config) -> Self {
        AppState { storage, config }
    }

    pub fn is_production(&self) -> bool {
        self.config.is_production()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
