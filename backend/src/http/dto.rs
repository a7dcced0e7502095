//! Data Transfer Objects for the HTTP API.
//!
//! Resource records are serialized straight from [`crate::models`]; this
//! module only holds the envelope types that have no model counterpart.

use serde::{Deserialize, Serialize};

pub use crate::models::{Appointment, AppointmentDraft, Barber, Service};
pub use crate::services::{AppointmentQuery, DiagnosticsReport};

/// Static liveness message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store connection status
    pub database: String,
}
