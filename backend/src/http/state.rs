//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DocumentStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store handle shared by every request
    pub store: Arc<dyn DocumentStore>,
    /// Configuration the server was started with
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new application state with the given store.
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
