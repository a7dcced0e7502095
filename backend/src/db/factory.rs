//! Store factory for dependency injection.
//!
//! This module creates document store instances from runtime configuration.
//! Every store it hands out is wrapped in a [`TimeoutStore`] so that callers
//! never wait on the backend longer than the configured deadline.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::store::{DocumentStore, StoreError, StoreResult};
use super::stores::{LocalStore, TimeoutStore};
#[cfg(feature = "postgres-repo")]
use super::stores::PostgresStore;
use super::PostgresConfig;
use crate::config::AppConfig;

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local store
    Local,
}

impl FromStr for StoreType {
    type Err = String;

    /// Parse store type from string ("postgres", "pg", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown store type: {}", s)),
        }
    }
}

impl StoreType {
    /// Get store type from environment variables.
    ///
    /// Reads `STORE_TYPE`. Defaults to Postgres if a database URL is present,
    /// otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("STORE_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Factory for creating store instances.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use barbershop::db::StoreFactory;
///
/// let store = StoreFactory::create_local(Duration::from_secs(5));
/// assert_eq!(store.database_name().as_deref(), Some("local"));
/// ```
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store instance based on type.
    ///
    /// # Arguments
    /// * `store_type` - Backend to create
    /// * `postgres_config` - Database configuration (required for Postgres)
    /// * `timeout` - Deadline applied to every store round-trip
    pub async fn create(
        store_type: StoreType,
        postgres_config: Option<&PostgresConfig>,
        timeout: Duration,
    ) -> StoreResult<Arc<dyn DocumentStore>> {
        match store_type {
            StoreType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        StoreError::configuration("Postgres store requires PostgresConfig")
                    })?;
                    Self::create_postgres(config, timeout).await
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = (postgres_config, timeout);
                    Err(StoreError::configuration(
                        "Postgres store feature not enabled",
                    ))
                }
            }
            StoreType::Local => Ok(Self::create_local(timeout)),
        }
    }

    /// Create a Postgres store. Connecting and migrating run on the blocking pool.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
        timeout: Duration,
    ) -> StoreResult<Arc<dyn DocumentStore>> {
        let config = config.clone();
        let store = tokio::task::spawn_blocking(move || PostgresStore::new(config))
            .await
            .map_err(|e| StoreError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(TimeoutStore::new(store, timeout)))
    }

    /// Create an in-memory local store.
    pub fn create_local(timeout: Duration) -> Arc<dyn DocumentStore> {
        Arc::new(TimeoutStore::new(LocalStore::new(), timeout))
    }

    /// Wrap an existing local store, keeping the caller's handle usable.
    pub fn wrap_local(store: LocalStore, timeout: Duration) -> Arc<dyn DocumentStore> {
        Arc::new(TimeoutStore::new(store, timeout))
    }

    /// Create the store described by the application configuration.
    pub async fn from_config(config: &AppConfig) -> StoreResult<Arc<dyn DocumentStore>> {
        let store_type = config
            .store_type()
            .map_err(|e| StoreError::configuration(e.to_string()))?;
        let postgres_config = config.to_postgres_config();
        Self::create(store_type, postgres_config.as_ref(), config.store_timeout()).await
    }
}
