//! Shared helpers for integration tests.

#![allow(dead_code)]

use barbershop::db::{LocalStore, StoreFactory, BARBER_COLLECTION, SERVICE_COLLECTION};
use barbershop::models::{AppointmentDraft, Barber, Service};
use barbershop::services;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// A bootstrapped in-memory store holding the default catalog.
pub struct SeededStore {
    /// Direct handle, for inspection and health toggling
    pub local: LocalStore,
    /// The same store behind the timeout decorator, as the server sees it
    pub store: Arc<dyn barbershop::db::DocumentStore>,
    pub services: Vec<Service>,
    pub barbers: Vec<Barber>,
}

pub async fn seeded_store() -> SeededStore {
    let local = LocalStore::new();
    let store = StoreFactory::wrap_local(local.clone(), Duration::from_secs(2));
    services::bootstrap(store.as_ref(), true)
        .await
        .expect("bootstrap failed");
    let catalog = services::list_services(store.as_ref())
        .await
        .expect("list services");
    let barbers = services::list_barbers(store.as_ref())
        .await
        .expect("list barbers");
    assert_eq!(local.document_count(SERVICE_COLLECTION), catalog.len());
    assert_eq!(local.document_count(BARBER_COLLECTION), barbers.len());
    SeededStore {
        local,
        store,
        services: catalog,
        barbers,
    }
}

/// A valid booking request for the given references and slot.
pub fn booking(service_id: &str, barber_id: &str, date: &str, time: &str) -> AppointmentDraft {
    AppointmentDraft {
        customer_name: "Jordan Lee".to_string(),
        customer_phone: "+1 555 0134".to_string(),
        customer_email: Some("jordan@example.com".to_string()),
        service_id: service_id.to_string(),
        barber_id: barber_id.to_string(),
        date: date.to_string(),
        time: time.to_string(),
    }
}
