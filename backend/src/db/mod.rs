//! Document store module.
//!
//! This module provides the storage abstraction the booking service runs on:
//! a small document-database contract, its implementations, and the id and
//! filter types that cross into store queries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, bootstrap)                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (crate::services) - Business Logic       │
//! │  - Booking validation                                    │
//! │  - Default data seeding                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  DocumentStore Trait (store/) - Abstract Interface      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres Store   │     │ Local Store             │
//! │ (JSONB rows)     │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! - `id`: native ids and the `parse_id` boundary function
//! - `document`: documents, filters and typed encode/decode helpers
//! - `store`: the `DocumentStore` trait and its error types
//! - `stores`: in-memory, Postgres and timeout-decorator implementations
//! - `factory`: creating stores from configuration

pub mod document;
pub mod factory;
pub mod id;
pub mod store;
pub mod stores;

pub use document::{decode, encode, Document, Filter, StoredDocument};
pub use factory::{StoreFactory, StoreType};
pub use id::{parse_id, DocumentId, ObjectId};
pub use store::{DocumentStore, ErrorContext, StoreError, StoreResult};
pub use stores::{LocalStore, TimeoutStore};

// Postgres config is colocated with the store implementation.
#[cfg(feature = "postgres-repo")]
pub use stores::{PostgresConfig, PostgresStore};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

/// Collection holding services.
pub const SERVICE_COLLECTION: &str = "service";
/// Collection holding barbers.
pub const BARBER_COLLECTION: &str = "barber";
/// Collection holding appointments.
pub const APPOINTMENT_COLLECTION: &str = "appointment";
