//! # Document store collaborator
//!
//! The HTTP adapter never touches storage directly. It talks to a
//! [`DocumentStore`], an async trait shaped after what a managed document
//! database client offers: create, read, partial update, delete, and a
//! filtered/sorted/limited query built from a [`docgate::QueryPlan`].
//!
//! [`InMemoryStore`] is the bundled implementation. It emulates managed-store
//! semantics closely enough to run the service locally and in tests:
//!
//! - documents are kept per collection path and iterate in id order
//! - subcollections live at `parent/{id}/child`
//! - dotted field paths reach into nested objects
//! - numbers compare numerically across integer and float
//! - range and `in` filters only match comparable types
//! - ordering on a field excludes documents that lack it
//! - empty field paths and oversized `in` lists are rejected as invalid filters
//!
//! ## Example
//!
//! ```
//! use docgate::{FilterValue, Operator, Predicate, Scalar};
//! use serde_json::json;
//! use store::{DocumentStore, InMemoryStore};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = InMemoryStore::new();
//! let data = json!({"status": "new", "total": 12}).as_object().cloned().unwrap();
//! store.create("orders", data, Some("o1".into())).await.unwrap();
//!
//! let filter = Predicate::new("total", Operator::Gte, FilterValue::Scalar(Scalar::Int(10)));
//! let found = store.query("orders", &[filter], &[], 20).await.unwrap();
//! assert_eq!(found[0].id, "o1");
//! # }
//! ```

mod document;
mod error;
pub mod eval;
mod memory;

use async_trait::async_trait;
use docgate::{Predicate, SortKey};
use serde_json::{Map, Value};

pub use crate::document::{Document, NestedDocument, subcollection_path};
pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::InMemoryStore;

/// Operations the adapter needs from the backing document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `data` under `id`, or under a generated id when `id` is `None`.
    async fn create(
        &self,
        collection: &str,
        data: Map<String, Value>,
        id: Option<String>,
    ) -> StoreResult<Document>;

    /// Fetch one document; `Ok(None)` when it does not exist.
    async fn read(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge `partial` into an existing document. Fails with `NotFound`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        partial: Map<String, Value>,
    ) -> StoreResult<Document>;

    /// Remove one document. Fails with `NotFound`.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Documents matching every predicate, ordered by `sort`, at most `limit`.
    async fn query(
        &self,
        collection: &str,
        predicates: &[Predicate],
        sort: &[SortKey],
        limit: usize,
    ) -> StoreResult<Vec<Document>>;

    /// Parents matching `collection_filters`, each with its children in
    /// `subcollection` matching `subcollection_filters`.
    async fn query_with_subcollection(
        &self,
        collection: &str,
        subcollection: &str,
        collection_filters: &[Predicate],
        subcollection_filters: &[Predicate],
    ) -> StoreResult<Vec<NestedDocument>>;

    /// Cheap reachability check used by readiness probes.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
