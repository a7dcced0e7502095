//! Resource schemas.
//!
//! Each resource has an outbound record (carrying its id as a string) and an
//! inbound or insert shape with an explicit `validate` function. Validators
//! collect every field-level problem instead of stopping at the first one.

pub mod appointment;
pub mod barber;
pub mod service;
pub mod validation;

pub use appointment::{Appointment, AppointmentDraft};
pub use barber::{Barber, NewBarber};
pub use service::{NewService, Service};
pub use validation::{FieldError, ValidationErrors};
