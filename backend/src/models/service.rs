//! Service schema.

use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;

/// Shortest bookable service, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 10;
/// Longest bookable service, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 240;

/// A service offered by the shop, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// A service to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub duration_minutes: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewService {
    pub fn new(name: &str, duration_minutes: u32, price: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            duration_minutes,
            price,
            description: Some(description.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name);
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            errors.push(
                "duration_minutes",
                format!(
                    "must be between {} and {}",
                    MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
                ),
            );
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.push("price", "must be a non-negative amount");
        }
        errors.into_result()
    }
}
