//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Largest accepted request body. Booking payloads are a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/hello", get(handlers::hello))
        .route("/services", get(handlers::list_services))
        .route("/barbers", get(handlers::list_barbers))
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/test", get(handlers::test_database))
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::StoreFactory;
    use std::time::Duration;

    #[test]
    fn test_router_creation() {
        let store = StoreFactory::create_local(Duration::from_secs(1));
        let state = AppState::new(store, AppConfig::default());
        let _router = create_router(state);
    }
}
