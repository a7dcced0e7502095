//! Appointment schema.

use serde::{Deserialize, Serialize};

use super::validation::{is_valid_date, is_valid_email, is_valid_time, ValidationErrors};

/// A booked appointment, as returned by the API.
///
/// `service_id` and `barber_id` are stored exactly as the customer supplied
/// them; they are never rewritten into the store's native id form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub service_id: String,
    pub barber_id: String,
    pub date: String,
    pub time: String,
}

/// A booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub service_id: String,
    pub barber_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
}

impl AppointmentDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("customer_name", &self.customer_name);
        errors.require_text("customer_phone", &self.customer_phone);
        if let Some(ref email) = self.customer_email {
            if !is_valid_email(email) {
                errors.push("customer_email", "must be a valid email address");
            }
        }
        errors.require_text("service_id", &self.service_id);
        errors.require_text("barber_id", &self.barber_id);
        if !is_valid_date(&self.date) {
            errors.push("date", "must be a calendar date formatted YYYY-MM-DD");
        }
        if !is_valid_time(&self.time) {
            errors.push("time", "must be a 24-hour time formatted HH:MM");
        }
        errors.into_result()
    }
}
