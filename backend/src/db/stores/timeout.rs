//! Deadline decorator for any [`DocumentStore`].
//!
//! Every round-trip is bounded by the configured duration. An elapsed call is
//! reported as [`StoreError::TimeoutError`], which callers treat as a transient
//! store failure.

use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::time::Duration;

use crate::db::document::{Document, Filter, StoredDocument};
use crate::db::id::DocumentId;
use crate::db::store::{DocumentStore, ErrorContext, StoreError, StoreResult};

/// Wraps a store so that no single call outlives `timeout`.
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: DocumentStore> TimeoutStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T, F>(&self, operation: &str, collection: Option<&str>, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Store operation '{}' timed out after {:?}",
                    operation, self.timeout
                );
                let mut context = ErrorContext::new(operation)
                    .with_details(format!("timeout_ms={}", self.timeout.as_millis()))
                    .retryable();
                if let Some(collection) = collection {
                    context = context.with_entity(collection);
                }
                Err(StoreError::TimeoutError {
                    message: "Store did not respond in time".to_string(),
                    context,
                })
            }
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for TimeoutStore<S> {
    async fn health_check(&self) -> StoreResult<bool> {
        self.bounded("health_check", None, self.inner.health_check())
            .await
    }

    fn database_name(&self) -> Option<String> {
        self.inner.database_name()
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.bounded("list_collections", None, self.inner.list_collections())
            .await
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        self.bounded(
            "insert",
            Some(collection),
            self.inner.insert(collection, document),
        )
        .await
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: DocumentId,
        document: Document,
    ) -> StoreResult<DocumentId> {
        self.bounded(
            "insert_with_id",
            Some(collection),
            self.inner.insert_with_id(collection, id, document),
        )
        .await
    }

    async fn ensure_unique_index(&self, collection: &str, fields: &[&str]) -> StoreResult<()> {
        self.bounded(
            "ensure_unique_index",
            Some(collection),
            self.inner.ensure_unique_index(collection, fields),
        )
        .await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        self.bounded("find", Some(collection), self.inner.find(collection, filter))
            .await
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        self.bounded(
            "find_one",
            Some(collection),
            self.inner.find_one(collection, id),
        )
        .await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.bounded("count", Some(collection), self.inner.count(collection, filter))
            .await
    }
}
