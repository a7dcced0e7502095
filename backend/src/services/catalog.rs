//! Read-side queries for services, barbers and appointments.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::db::{
    decode, DocumentStore, Filter, StoreResult, APPOINTMENT_COLLECTION, BARBER_COLLECTION,
    SERVICE_COLLECTION,
};
use crate::models::{Appointment, Barber, Service};

/// Optional filters for listing appointments.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppointmentQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub barber_id: Option<String>,
}

impl AppointmentQuery {
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(date) = self.date.as_deref().filter(|d| !d.is_empty()) {
            filter = filter.eq("date", date);
        }
        // stored as the literal string the customer supplied
        if let Some(barber_id) = self.barber_id.as_deref().filter(|b| !b.is_empty()) {
            filter = filter.eq("barber_id", barber_id);
        }
        filter
    }
}

async fn list_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    filter: &Filter,
) -> StoreResult<Vec<T>> {
    store
        .find(collection, filter)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

/// Every service, in insertion order.
pub async fn list_services(store: &dyn DocumentStore) -> StoreResult<Vec<Service>> {
    list_all(store, SERVICE_COLLECTION, &Filter::new()).await
}

/// Every barber, in insertion order.
pub async fn list_barbers(store: &dyn DocumentStore) -> StoreResult<Vec<Barber>> {
    list_all(store, BARBER_COLLECTION, &Filter::new()).await
}

/// Appointments matching `query`.
pub async fn list_appointments(
    store: &dyn DocumentStore,
    query: &AppointmentQuery,
) -> StoreResult<Vec<Appointment>> {
    list_all(store, APPOINTMENT_COLLECTION, &query.to_filter()).await
}
