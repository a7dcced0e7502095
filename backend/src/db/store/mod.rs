//! Document store trait.
//!
//! The store is the sole owner of persisted state. It exposes a small CRUD
//! surface over named collections of JSON documents; it guarantees atomic
//! single-document writes but no cross-document transactions. The only
//! cross-document guarantee it offers is a declared uniqueness constraint
//! (see [`DocumentStore::ensure_unique_index`]).

use async_trait::async_trait;

pub mod error;

pub use error::{ErrorContext, StoreError, StoreResult};

use super::document::{Document, Filter, StoredDocument};
use super::id::DocumentId;

/// Abstract document database.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one handle is shared by all
/// concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ==================== Health & Diagnostics ====================

    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it answered but reports itself unhealthy
    /// - `Err(StoreError)` if the check could not be performed
    async fn health_check(&self) -> StoreResult<bool>;

    /// Name of the underlying database, when the backend has one.
    fn database_name(&self) -> Option<String>;

    /// Names of the collections holding at least one document, sorted.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    // ==================== Writes ====================

    /// Insert a document, letting the store assign a native id.
    ///
    /// # Returns
    /// * `Ok(DocumentId)` - The assigned id
    /// * `Err(StoreError::DuplicateKey)` - If a declared unique index is violated
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId>;

    /// Insert a document under a caller-chosen id.
    ///
    /// # Returns
    /// * `Err(StoreError::DuplicateKey)` - If the id or a unique index is already taken
    async fn insert_with_id(
        &self,
        collection: &str,
        id: DocumentId,
        document: Document,
    ) -> StoreResult<DocumentId>;

    /// Declare a composite uniqueness constraint over `fields`.
    ///
    /// Idempotent. Fails if documents already violating it exist. A missing
    /// field counts as `null`, and two `null`s collide like any equal values.
    async fn ensure_unique_index(&self, collection: &str, fields: &[&str]) -> StoreResult<()>;

    // ==================== Reads ====================

    /// All documents matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>>;

    /// The document with the given id, if any.
    async fn find_one(&self, collection: &str, id: &DocumentId)
        -> StoreResult<Option<StoredDocument>>;

    /// Number of documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}
