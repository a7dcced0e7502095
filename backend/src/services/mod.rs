//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP layer and the document store. Each function
//! takes the store handle explicitly; there is no process-wide state.

pub mod booking;
pub mod catalog;
pub mod diagnostics;
pub mod seed;

pub use booking::{ensure_slot_index, validate_and_book, BookingError, ReferenceField};
pub use catalog::{list_appointments, list_barbers, list_services, AppointmentQuery};
pub use diagnostics::{snapshot, DiagnosticsReport};
pub use seed::{seed_defaults, SeedReport};

use crate::db::{DocumentStore, StoreResult};

/// One-time store initialization run by the server before it accepts requests.
///
/// Declares the appointment slot index, then seeds the default catalog when
/// `seed` is set.
pub async fn bootstrap(store: &dyn DocumentStore, seed: bool) -> StoreResult<SeedReport> {
    ensure_slot_index(store).await?;
    if !seed {
        return Ok(SeedReport::default());
    }
    seed_defaults(store).await
}
