//! Store connectivity snapshot served by `GET /test`.
//!
//! Failures are reported inside the snapshot; taking one never fails.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::DocumentStore;

const MAX_COLLECTIONS: usize = 10;
const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    /// Name reported by the store itself, when it has one.
    pub store_name: Option<String>,
    pub collections: Vec<String>,
}

fn set_flag(configured: bool) -> String {
    if configured { "✅ Set" } else { "❌ Not Set" }.to_string()
}

fn truncated(err: impl std::fmt::Display) -> String {
    err.to_string().chars().take(MAX_ERROR_CHARS).collect()
}

pub async fn snapshot(store: &dyn DocumentStore, config: &AppConfig) -> DiagnosticsReport {
    let mut report = DiagnosticsReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: set_flag(config.database_url_configured()),
        database_name: set_flag(config.database_name_configured()),
        connection_status: "Not Connected".to_string(),
        store_name: store.database_name(),
        collections: Vec::new(),
    };

    let (health, collections) = futures::join!(store.health_check(), store.list_collections());

    match health {
        Ok(true) => {
            report.connection_status = "Connected".to_string();
            match collections {
                Ok(mut names) => {
                    names.truncate(MAX_COLLECTIONS);
                    report.collections = names;
                    report.database = "✅ Connected & Working".to_string();
                }
                Err(e) => {
                    report.database = format!("⚠️  Connected but Error: {}", truncated(e));
                }
            }
        }
        Ok(false) => {
            report.database = "⚠️  Available but not initialized".to_string();
        }
        Err(e) => {
            log::warn!("Store health check failed: {}", e);
            report.database = format!("❌ Error: {}", truncated(e));
        }
    }

    report
}
