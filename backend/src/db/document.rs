//! Documents, filters and typed (de)serialization helpers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::id::DocumentId;
use super::store::{ErrorContext, StoreError, StoreResult};

/// Body of a stored document.
pub type Document = Map<String, Value>;

/// A document together with its store-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

impl StoredDocument {
    pub fn new(id: DocumentId, body: Document) -> Self {
        Self { id, body }
    }

    /// Value of a top-level field, `Null` when the field is absent.
    pub fn field(&self, name: &str) -> &Value {
        self.body.get(name).unwrap_or(&Value::Null)
    }
}

/// Conjunction of equality predicates over a collection.
///
/// ```
/// use barbershop::db::Filter;
///
/// let filter = Filter::new().eq("date", "2024-06-01").eq("time", "14:00");
/// assert_eq!(filter.clauses().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    id: Option<DocumentId>,
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the document with the given id.
    pub fn by_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// Evaluate the filter against a document. Absent fields never match.
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        if let Some(ref id) = self.id {
            if id != &doc.id {
                return false;
            }
        }
        self.clauses
            .iter()
            .all(|(field, value)| doc.body.get(field) == Some(value))
    }

    /// Field clauses as a single JSON object, suitable for containment queries.
    pub fn clauses_as_object(&self) -> Value {
        Value::Object(self.clauses.iter().cloned().collect())
    }
}

/// Serialize a typed record into a document body.
///
/// Any `id` field is dropped: the store owns identifiers.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(StoreError::validation_with_context(
            format!("expected a JSON object, got {}", other),
            ErrorContext::new("encode"),
        )),
        Err(e) => Err(StoreError::internal_with_context(
            e.to_string(),
            ErrorContext::new("encode"),
        )),
    }
}

/// Deserialize a stored document, exposing its id as a string `id` field.
pub fn decode<T: DeserializeOwned>(doc: StoredDocument) -> StoreResult<T> {
    let StoredDocument { id, mut body } = doc;
    let id_str = id.to_string();
    body.insert("id".to_string(), Value::String(id_str.clone()));
    serde_json::from_value(Value::Object(body)).map_err(|e| {
        StoreError::internal_with_context(
            format!("Failed to decode document: {}", e),
            ErrorContext::new("decode").with_entity_id(id_str),
        )
    })
}
