use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use docgate::{Predicate, SortKey};
use serde_json::{Map, Value};

use crate::document::{Document, NestedDocument, subcollection_path};
use crate::error::{StoreError, StoreResult};
use crate::eval::{matches_all, sort_documents, validate};
use crate::DocumentStore;

/// Length of generated document ids.
const GENERATED_ID_LEN: usize = 20;

type Collection = BTreeMap<String, Map<String, Value>>;

/// An in-memory store using a `RwLock` around per-collection ordered maps.
///
/// Collections are keyed by path, so a subcollection of `users/u1` lives at
/// `users/u1/files`. Documents iterate in id order.
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored in `collection`.
    pub fn len(&self, collection: &str) -> StoreResult<usize> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(collection).map_or(0, BTreeMap::len))
    }

    fn generate_id() -> String {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(GENERATED_ID_LEN);
        id
    }

    fn validate_id(id: &str) -> StoreResult<()> {
        if id.is_empty() || id.contains('/') || id == "." || id == ".." {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(())
    }

    fn select(
        &self,
        collection: &str,
        predicates: &[Predicate],
    ) -> StoreResult<Vec<Document>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let Some(docs) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, fields)| matches_all(fields, predicates))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(
        &self,
        collection: &str,
        data: Map<String, Value>,
        id: Option<String>,
    ) -> StoreResult<Document> {
        let id = match id {
            Some(id) => {
                Self::validate_id(&id)?;
                id
            }
            None => Self::generate_id(),
        };
        // Writing to an existing id replaces the document, like a `set`.
        self.collections
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());
        tracing::debug!(collection, doc_id = %id, "created document");
        Ok(Document::new(id, data))
    }

    async fn read(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let doc = guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()));
        if doc.is_some() {
            tracing::debug!(collection, doc_id = id, "read document");
        }
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: Map<String, Value>,
    ) -> StoreResult<Document> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let fields = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        for (key, value) in partial {
            fields.insert(key, value);
        }
        tracing::debug!(collection, doc_id = id, "updated document");
        Ok(Document::new(id, fields.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        guard
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        tracing::debug!(collection, doc_id = id, "deleted document");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        sort: &[SortKey],
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        validate(predicates, sort)?;
        let mut docs = self.select(collection, predicates)?;
        sort_documents(&mut docs, sort);
        docs.truncate(limit);
        tracing::debug!(collection, returned = docs.len(), "queried collection");
        Ok(docs)
    }

    async fn query_with_subcollection(
        &self,
        collection: &str,
        subcollection: &str,
        collection_filters: &[Predicate],
        subcollection_filters: &[Predicate],
    ) -> StoreResult<Vec<NestedDocument>> {
        validate(collection_filters, &[])?;
        validate(subcollection_filters, &[])?;

        let mut results = Vec::new();
        for parent in self.select(collection, collection_filters)? {
            let path = subcollection_path(collection, &parent.id, subcollection);
            let children = self.select(&path, subcollection_filters)?;
            // With child filters, parents without a matching child are dropped.
            if subcollection_filters.is_empty() || !children.is_empty() {
                results.push(NestedDocument { parent, children });
            }
        }
        tracing::debug!(
            collection,
            subcollection,
            found = results.len(),
            "queried collection with subcollection"
        );
        Ok(results)
    }
}
