//! Default catalog data.
//!
//! Seeding is idempotent per collection: a collection is populated only when
//! it is empty, so restarting the server never duplicates the defaults.

use log::{debug, info};

use crate::db::{encode, DocumentStore, Filter, StoreError, BARBER_COLLECTION, SERVICE_COLLECTION};
use crate::models::{NewBarber, NewService};

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub services_inserted: usize,
    pub barbers_inserted: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.services_inserted == 0 && self.barbers_inserted == 0
    }
}

pub fn default_services() -> Vec<NewService> {
    vec![
        NewService::new("Haircut", 30, 25.0, "Classic cut and style"),
        NewService::new("Beard Trim", 20, 15.0, "Shape and trim"),
        NewService::new("Haircut + Beard", 50, 35.0, "Complete grooming"),
        NewService::new("Buzz Cut", 20, 18.0, "Clean buzz all around"),
    ]
}

pub fn default_barbers() -> Vec<NewBarber> {
    vec![
        NewBarber::new(
            "Alex",
            &["Fade", "Beard"],
            "Detail-oriented with 7 years experience.",
        ),
        NewBarber::new(
            "Jamie",
            &["Classic", "Scissor Cut"],
            "Loves classic looks and great chats.",
        ),
        NewBarber::new("Riley", &["Buzz", "Kids"], "Fast and friendly."),
    ]
}

async fn is_empty(store: &dyn DocumentStore, collection: &str) -> Result<bool, StoreError> {
    Ok(store.count(collection, &Filter::new()).await? == 0)
}

fn invalid_default(collection: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::internal(format!("Invalid default {} record: {}", collection, err))
}

/// Populate empty service and barber collections with the default catalog.
pub async fn seed_defaults(store: &dyn DocumentStore) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if is_empty(store, SERVICE_COLLECTION).await? {
        for service in default_services() {
            service
                .validate()
                .map_err(|e| invalid_default(SERVICE_COLLECTION, e))?;
            store.insert(SERVICE_COLLECTION, encode(&service)?).await?;
            report.services_inserted += 1;
        }
    } else {
        debug!("Services already present, skipping seed");
    }

    if is_empty(store, BARBER_COLLECTION).await? {
        for barber in default_barbers() {
            barber
                .validate()
                .map_err(|e| invalid_default(BARBER_COLLECTION, e))?;
            store.insert(BARBER_COLLECTION, encode(&barber)?).await?;
            report.barbers_inserted += 1;
        }
    } else {
        debug!("Barbers already present, skipping seed");
    }

    if !report.is_noop() {
        info!(
            "Seeded {} services and {} barbers",
            report.services_inserted, report.barbers_inserted
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalStore;

    #[test]
    fn test_defaults_pass_validation() {
        assert!(default_services().iter().all(|s| s.validate().is_ok()));
        assert!(default_barbers().iter().all(|b| b.validate().is_ok()));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = LocalStore::new();
        let first = seed_defaults(&store).await.unwrap();
        assert_eq!(first.services_inserted, 4);
        assert_eq!(first.barbers_inserted, 3);

        let second = seed_defaults(&store).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(store.document_count(SERVICE_COLLECTION), 4);
        assert_eq!(store.document_count(BARBER_COLLECTION), 3);
    }

    #[tokio::test]
    async fn test_seed_fills_only_empty_collections() {
        let store = LocalStore::new();
        store
            .insert(
                BARBER_COLLECTION,
                encode(&NewBarber::new("Kim", &[], "")).unwrap(),
            )
            .await
            .unwrap();

        let report = seed_defaults(&store).await.unwrap();
        assert_eq!(report.services_inserted, 4);
        assert_eq!(report.barbers_inserted, 0);
        assert_eq!(store.document_count(BARBER_COLLECTION), 1);
    }
}
