//! Appointment booking.
//!
//! [`validate_and_book`] decides whether one booking request may be persisted.
//! The checks run in a fixed order and stop at the first failure:
//!
//! 1. the referenced service exists,
//! 2. the referenced barber exists,
//! 3. the barber's (date, time) slot is free,
//! 4. insert and re-read the canonical record.
//!
//! Steps 3 and 4 are separate round-trips, so the pre-check alone cannot stop
//! two concurrent requests for the same slot. The store-level unique index
//! declared by [`ensure_slot_index`] is the authoritative guard: a duplicate-key
//! failure on insert is reported as [`BookingError::SlotConflict`].

use log::{info, warn};
use std::fmt;

use crate::db::{
    decode, encode, parse_id, DocumentStore, ErrorContext, Filter, StoreError,
    APPOINTMENT_COLLECTION, BARBER_COLLECTION, SERVICE_COLLECTION,
};
use crate::models::{Appointment, AppointmentDraft};

/// Fields that make up a slot. At most one appointment may hold a given slot.
pub const SLOT_FIELDS: [&str; 3] = ["barber_id", "date", "time"];

/// Foreign-key field of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    ServiceId,
    BarberId,
}

impl ReferenceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceField::ServiceId => "service_id",
            ReferenceField::BarberId => "barber_id",
        }
    }

    fn collection(&self) -> &'static str {
        match self {
            ReferenceField::ServiceId => SERVICE_COLLECTION,
            ReferenceField::BarberId => BARBER_COLLECTION,
        }
    }
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a booking was not accepted.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// The referenced service or barber does not exist.
    #[error("Invalid {field}")]
    InvalidReference { field: ReferenceField },

    /// The barber already has an appointment at this date and time.
    #[error("Time slot already booked for this barber")]
    SlotConflict,

    /// The store failed; not a rejection of the request itself.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Declare the slot uniqueness constraint. Idempotent; run once at bootstrap.
pub async fn ensure_slot_index(store: &dyn DocumentStore) -> Result<(), StoreError> {
    store
        .ensure_unique_index(APPOINTMENT_COLLECTION, &SLOT_FIELDS)
        .await
}

async fn reference_exists(
    store: &dyn DocumentStore,
    field: ReferenceField,
    raw_id: &str,
) -> Result<bool, StoreError> {
    let filter = Filter::new().by_id(parse_id(raw_id));
    Ok(store.count(field.collection(), &filter).await? > 0)
}

fn slot_filter(draft: &AppointmentDraft) -> Filter {
    Filter::new()
        .eq("barber_id", draft.barber_id.as_str())
        .eq("date", draft.date.as_str())
        .eq("time", draft.time.as_str())
}

/// Validate a booking request against the store and persist it when accepted.
///
/// The draft's shape (date/time formats, required fields) must already have
/// been checked with [`AppointmentDraft::validate`].
///
/// # Returns
/// * `Ok(Appointment)` - The created record, as re-read from the store
/// * `Err(BookingError::InvalidReference)` - Unknown service (checked first) or barber
/// * `Err(BookingError::SlotConflict)` - The slot is taken
/// * `Err(BookingError::Store)` - The store failed or timed out
pub async fn validate_and_book(
    store: &dyn DocumentStore,
    draft: &AppointmentDraft,
) -> Result<Appointment, BookingError> {
    if !reference_exists(store, ReferenceField::ServiceId, &draft.service_id).await? {
        info!("Rejected booking: unknown service_id '{}'", draft.service_id);
        return Err(BookingError::InvalidReference {
            field: ReferenceField::ServiceId,
        });
    }

    if !reference_exists(store, ReferenceField::BarberId, &draft.barber_id).await? {
        info!("Rejected booking: unknown barber_id '{}'", draft.barber_id);
        return Err(BookingError::InvalidReference {
            field: ReferenceField::BarberId,
        });
    }

    // barber_id is compared in the literal form it was stored in
    if store.count(APPOINTMENT_COLLECTION, &slot_filter(draft)).await? > 0 {
        info!(
            "Rejected booking: barber '{}' already booked at {} {}",
            draft.barber_id, draft.date, draft.time
        );
        return Err(BookingError::SlotConflict);
    }

    let inserted_id = match store.insert(APPOINTMENT_COLLECTION, encode(draft)?).await {
        Ok(id) => id,
        Err(e) if e.is_duplicate_key() => {
            warn!(
                "Concurrent booking lost the race for barber '{}' at {} {}",
                draft.barber_id, draft.date, draft.time
            );
            return Err(BookingError::SlotConflict);
        }
        Err(e) => return Err(e.into()),
    };

    let lookup_id = parse_id(&inserted_id.to_string());
    let record = store
        .find_one(APPOINTMENT_COLLECTION, &lookup_id)
        .await?
        .ok_or_else(|| {
            StoreError::not_found_with_context(
                "Inserted appointment could not be read back",
                ErrorContext::new("validate_and_book")
                    .with_entity(APPOINTMENT_COLLECTION)
                    .with_entity_id(&inserted_id),
            )
        })?;

    let appointment: Appointment = decode(record)?;
    info!(
        "Booked appointment {} with barber '{}' at {} {}",
        appointment.id, appointment.barber_id, appointment.date, appointment.time
    );
    Ok(appointment)
}
