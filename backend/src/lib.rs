//! # Barber Shop Booking API
//!
//! A small booking service for a barber shop: services, barbers and
//! appointments exposed as REST resources over a document store.
//!
//! ## Features
//!
//! - **Catalog**: list services and barbers, seeded with defaults on first run
//! - **Booking**: create appointments with referential checks and slot exclusivity
//! - **Stores**: in-memory store for development, Postgres JSONB store for deployment
//! - **HTTP API**: axum router with CORS, compression and tracing
//!
//! ## Architecture
//!
//! - [`config`]: configuration file and environment overrides
//! - [`db`]: document store contract, implementations and id handling
//! - [`models`]: resource schemas and their validators
//! - [`services`]: booking, catalog queries, seeding and diagnostics
//! - [`http`]: axum router and request handlers
//!
//! ## Cargo features
//!
//! - `postgres-repo`: Postgres store via Diesel
//! - `http-server` (default): the HTTP layer and the `barbershop-server` binary

// StoreError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
