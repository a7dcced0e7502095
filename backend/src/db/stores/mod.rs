//! Document store implementations.
//!
//! - `local`: In-memory implementation for tests, local development and the
//!   fallback when no database is configured; always compiled
//! - `postgres`: PostgreSQL implementation with Diesel ORM (JSONB documents)
//! - `timeout`: Decorator bounding every round-trip of another store
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;
pub mod timeout;

pub use local::LocalStore;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresStore};
pub use timeout::TimeoutStore;
