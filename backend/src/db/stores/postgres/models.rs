use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::documents;
use crate::db::document::StoredDocument;
use crate::db::id::{DocumentId, ObjectId};
use crate::db::store::{ErrorContext, StoreError, StoreResult};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for ordering in SQL
pub struct DocumentRow {
    pub collection: String,
    pub native_id: bool,
    pub doc_id: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocumentRow {
    pub collection: String,
    pub native_id: bool,
    pub doc_id: String,
    pub body: Value,
}

impl NewDocumentRow {
    pub fn new(collection: &str, id: &DocumentId, body: Value) -> Self {
        Self {
            collection: collection.to_string(),
            native_id: id.is_native(),
            doc_id: id.as_key(),
            body,
        }
    }
}

impl DocumentRow {
    /// Rebuild the document id from its persisted key and tag.
    pub fn document_id(&self) -> StoreResult<DocumentId> {
        if !self.native_id {
            return Ok(DocumentId::Key(self.doc_id.clone()));
        }
        self.doc_id
            .parse::<ObjectId>()
            .map(DocumentId::Native)
            .map_err(|e| {
                StoreError::internal_with_context(
                    e.to_string(),
                    ErrorContext::new("decode_row").with_entity(self.collection.clone()),
                )
            })
    }

    pub fn into_document(self) -> StoreResult<StoredDocument> {
        let id = self.document_id()?;
        match self.body {
            Value::Object(map) => Ok(StoredDocument::new(id, map)),
            other => Err(StoreError::internal_with_context(
                format!("Document body is not an object: {}", other),
                ErrorContext::new("decode_row")
                    .with_entity(self.collection)
                    .with_entity_id(id),
            )),
        }
    }
}
