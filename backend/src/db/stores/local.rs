//! In-memory local store implementation.
//!
//! Collections live in a map guarded by a single `RwLock`. Every write takes the
//! write lock for its whole check-and-insert sequence, so uniqueness checks and
//! the insert they guard are atomic with respect to concurrent writers.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::db::document::{Document, Filter, StoredDocument};
use crate::db::id::{DocumentId, ObjectId};
use crate::db::store::{DocumentStore, ErrorContext, StoreError, StoreResult};

/// In-memory document store.
///
/// Cloning yields another handle onto the same data, which makes it convenient
/// to keep a handle in a test while the application owns another.
///
/// # Example
/// ```
/// use barbershop::db::{DocumentStore, Filter, LocalStore};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let store = LocalStore::new();
///     let mut doc = serde_json::Map::new();
///     doc.insert("name".into(), "Alex".into());
///     store.insert("barber", doc).await.unwrap();
///     assert_eq!(store.count("barber", &Filter::new()).await.unwrap(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalStore {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    collections: HashMap<String, Vec<StoredDocument>>,
    unique_indexes: HashMap<String, Vec<Vec<String>>>,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            unique_indexes: HashMap::new(),
            is_healthy: true,
        }
    }
}

fn index_key(body: &Document, fields: &[String]) -> Vec<Value> {
    fields
        .iter()
        .map(|f| body.get(f).cloned().unwrap_or(Value::Null))
        .collect()
}

impl LocalData {
    fn insert(
        &mut self,
        collection: &str,
        id: DocumentId,
        body: Document,
    ) -> StoreResult<DocumentId> {
        let existing = self.collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        if existing.iter().any(|doc| doc.id == id) {
            return Err(StoreError::duplicate_key_with_context(
                format!("Document id {} already exists", id),
                ErrorContext::new("insert")
                    .with_entity(collection)
                    .with_entity_id(&id),
            ));
        }

        if let Some(indexes) = self.unique_indexes.get(collection) {
            for fields in indexes {
                let key = index_key(&body, fields);
                if existing.iter().any(|doc| index_key(&doc.body, fields) == key) {
                    return Err(StoreError::duplicate_key_with_context(
                        format!("Unique index ({}) violated", fields.join(", ")),
                        ErrorContext::new("insert")
                            .with_entity(collection)
                            .with_details(format!("index={}", fields.join("_"))),
                    ));
                }
            }
        }

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument::new(id.clone(), body));
        Ok(id)
    }
}

impl LocalStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Remove all documents and indexes.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of documents in a collection.
    pub fn document_count(&self, collection: &str) -> usize {
        self.data
            .read()
            .collections
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str, collection: Option<&str>) -> StoreResult<()> {
        if !self.data.read().is_healthy {
            let mut context = ErrorContext::new(operation);
            if let Some(collection) = collection {
                context = context.with_entity(collection);
            }
            return Err(StoreError::connection_with_context(
                "Database is not healthy",
                context,
            ));
        }
        Ok(())
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    fn database_name(&self) -> Option<String> {
        Some("local".to_string())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.check_health("list_collections", None)?;
        let data = self.data.read();
        let mut names: Vec<String> = data
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        self.check_health("insert", Some(collection))?;
        let id = DocumentId::Native(ObjectId::new());
        let id = self.data.write().insert(collection, id, document)?;
        debug!("Inserted document {} into '{}'", id, collection);
        Ok(id)
    }

    async fn insert_with_id(
        &self,
        collection: &str,
        id: DocumentId,
        document: Document,
    ) -> StoreResult<DocumentId> {
        self.check_health("insert_with_id", Some(collection))?;
        self.data.write().insert(collection, id, document)
    }

    async fn ensure_unique_index(&self, collection: &str, fields: &[&str]) -> StoreResult<()> {
        self.check_health("ensure_unique_index", Some(collection))?;
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let mut data = self.data.write();

        if data
            .unique_indexes
            .get(collection)
            .is_some_and(|indexes| indexes.contains(&fields))
        {
            return Ok(());
        }

        if let Some(docs) = data.collections.get(collection) {
            let mut seen = HashSet::new();
            for doc in docs {
                let key = serde_json::to_string(&index_key(&doc.body, &fields))
                    .map_err(|e| StoreError::internal(e.to_string()))?;
                if !seen.insert(key) {
                    return Err(StoreError::duplicate_key_with_context(
                        "Existing documents violate the requested unique index",
                        ErrorContext::new("ensure_unique_index")
                            .with_entity(collection)
                            .with_details(format!("index={}", fields.join("_"))),
                    ));
                }
            }
        }

        data.unique_indexes
            .entry(collection.to_string())
            .or_default()
            .push(fields);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        self.check_health("find", Some(collection))?;
        let data = self.data.read();
        Ok(data
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> StoreResult<Option<StoredDocument>> {
        self.check_health("find_one", Some(collection))?;
        let data = self.data.read();
        Ok(data
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id).cloned()))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.check_health("count", Some(collection))?;
        let data = self.data.read();
        Ok(data
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("body must be an object"),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_native_ids() {
        let store = LocalStore::new();
        let a = store.insert("service", body(json!({"name": "Haircut"}))).await.unwrap();
        let b = store.insert("service", body(json!({"name": "Buzz Cut"}))).await.unwrap();
        assert!(a.is_native());
        assert_ne!(a, b);
        assert_eq!(store.document_count("service"), 2);
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = LocalStore::new();
        for name in ["a", "b", "c"] {
            store.insert("barber", body(json!({"name": name}))).await.unwrap();
        }
        let names: Vec<_> = store
            .find("barber", &Filter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.field("name").clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_find_one_and_count_by_id() {
        let store = LocalStore::new();
        let id = store.insert("service", body(json!({"name": "x"}))).await.unwrap();
        assert!(store.find_one("service", &id).await.unwrap().is_some());
        assert_eq!(
            store.count("service", &Filter::new().by_id(id.clone())).await.unwrap(),
            1
        );
        assert!(store.find_one("barber", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_with_duplicate_id_fails() {
        let store = LocalStore::new();
        let id = DocumentId::Key("alex".into());
        store.insert_with_id("barber", id.clone(), Document::new()).await.unwrap();
        let err = store.insert_with_id("barber", id, Document::new()).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_second_insert() {
        let store = LocalStore::new();
        store
            .ensure_unique_index("appointment", &["barber_id", "date", "time"])
            .await
            .unwrap();
        let slot = json!({"barber_id": "b1", "date": "2024-06-01", "time": "14:00"});
        store.insert("appointment", body(slot.clone())).await.unwrap();
        let err = store.insert("appointment", body(slot)).await.unwrap_err();
        assert!(err.is_duplicate_key());

        let other = json!({"barber_id": "b1", "date": "2024-06-01", "time": "14:30"});
        assert!(store.insert("appointment", body(other)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unique_index_treats_missing_fields_as_equal() {
        let store = LocalStore::new();
        store
            .ensure_unique_index("appointment", &["barber_id", "date", "time"])
            .await
            .unwrap();
        let partial = json!({"barber_id": "b1", "date": "2024-06-01"});
        store.insert("appointment", body(partial.clone())).await.unwrap();
        let err = store.insert("appointment", body(partial)).await.unwrap_err();
        assert!(err.is_duplicate_key());

        let explicit_null = json!({"barber_id": "b1", "date": "2024-06-01", "time": null});
        assert!(store
            .insert("appointment", body(explicit_null))
            .await
            .unwrap_err()
            .is_duplicate_key());
    }

    #[tokio::test]
    async fn test_ensure_unique_index_is_idempotent_and_checks_existing() {
        let store = LocalStore::new();
        store.insert("c", body(json!({"k": 1}))).await.unwrap();
        store.insert("c", body(json!({"k": 1}))).await.unwrap();
        assert!(store.ensure_unique_index("c", &["k"]).await.is_err());

        store.ensure_unique_index("d", &["k"]).await.unwrap();
        store.ensure_unique_index("d", &["k"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_unhealthy_store_fails_operations() {
        let store = LocalStore::new();
        store.set_healthy(false);
        assert!(!store.health_check().await.unwrap());
        let err = store.count("service", &Filter::new()).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(store.insert("service", Document::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_collections_sorted_and_clear() {
        let store = LocalStore::new();
        store.insert("service", Document::new()).await.unwrap();
        store.insert("barber", Document::new()).await.unwrap();
        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["barber".to_string(), "service".to_string()]
        );
        store.clear();
        assert!(store.list_collections().await.unwrap().is_empty());
    }
}
