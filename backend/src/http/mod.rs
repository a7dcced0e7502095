//! HTTP server module for the barber shop API.
//!
//! This module exposes the service layer as a REST API over axum.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and shape validation                   │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error mapping                       │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (crate::services)                          │
//! │  - Booking validation                                     │
//! │  - Catalog queries, diagnostics                           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Store Layer (crate::db)                                  │
//! │  - LocalStore / PostgresStore behind TimeoutStore         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Errors
//!
//! Every failure is returned as `{ "code", "detail", "errors"? }`:
//!
//! | code                | status |
//! |---------------------|--------|
//! | `INVALID_REFERENCE` | 400    |
//! | `MALFORMED_INPUT`   | 400    |
//! | `SLOT_CONFLICT`     | 409    |
//! | `PAYLOAD_TOO_LARGE` | 413    |
//! | `STORE_UNAVAILABLE` | 500    |
//! | `INTERNAL_ERROR`    | 500    |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
