//! Barber schema.

use serde::{Deserialize, Serialize};

use super::validation::ValidationErrors;

/// A barber, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barber {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// A barber to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBarber {
    pub name: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl NewBarber {
    pub fn new(name: &str, specialties: &[&str], bio: &str) -> Self {
        Self {
            name: name.to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            bio: Some(bio.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("name", &self.name);
        for (i, specialty) in self.specialties.iter().enumerate() {
            if specialty.trim().is_empty() {
                errors.push(&format!("specialties[{}]", i), "must not be blank");
            }
        }
        errors.into_result()
    }
}
