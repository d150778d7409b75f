use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::store::{Collection, DocumentStore, Filter, StoreError, Update};

/// In-process document store for local development and tests. Each call holds
/// the lock for its single document operation only.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map(Vec::len).unwrap_or(0)
    }
}

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, document: Value) -> Result<Value, StoreError> {
        let Value::Object(mut fields) = document else {
            return Err(StoreError::Malformed("documents must be JSON objects".to_string()));
        };

        let now = timestamp();
        fields.insert("_id".to_string(), json!(Uuid::new_v4().to_string()));
        fields.insert("createdAt".to_string(), json!(now));
        fields.insert("updatedAt".to_string(), json!(now));
        let document = Value::Object(fields);

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if let Some(key) = collection.unique_key() {
            if let Some(value) = document.get(key) {
                if documents.iter().any(|existing| existing.get(key) == Some(value)) {
                    return Err(StoreError::Duplicate {
                        collection,
                        key: key.to_string(),
                    });
                }
            }
        }

        documents.push(document.clone());
        debug!("Inserted document into {}", collection);
        Ok(document)
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: Update,
    ) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|document| filter.matches(document)))
        else {
            return Ok(None);
        };

        let Value::Object(fields) = document else {
            return Err(StoreError::Malformed("stored document is not an object".to_string()));
        };

        // Apply to a copy so a failed update leaves the stored document untouched.
        let mut updated = fields.clone();
        update.apply(&mut updated)?;
        updated.insert("updatedAt".to_string(), json!(timestamp()));
        *fields = updated;

        Ok(Some(document.clone()))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(None);
        };

        let removed = documents
            .iter()
            .position(|document| filter.matches(document))
            .map(|index| documents.remove(index));

        if removed.is_some() {
            debug!("Deleted document from {}", collection);
        }
        Ok(removed)
    }
}
