//! Document persistence collaborator.
//!
//! The domain stores entities as JSON documents in named collections.
//! Filtering, joins ("populate"), sorting, and pagination happen in the
//! domain layer; the store only has to provide identity-keyed access plus
//! a per-document atomic mutation primitive.

use crate::domain::error::Error;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// In-place document transformation, applied inside the store's
/// per-document critical section. Returning an error aborts the mutation
/// and surfaces it to the caller unchanged, so uniqueness checks on
/// embedded lists (charity support, participants) cannot race with a
/// concurrent append.
pub type Mutation = Box<dyn FnOnce(JsonValue) -> Result<JsonValue, Error> + Send>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document under `id`. Fails with `Conflict` if the id
    /// is already taken.
    async fn insert(&self, collection: &str, id: &str, doc: JsonValue) -> Result<(), Error>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<JsonValue>, Error>;

    /// Replaces an existing document wholesale. Returns false when the
    /// document does not exist.
    async fn put(&self, collection: &str, id: &str, doc: JsonValue) -> Result<bool, Error>;

    /// Atomic read-transform-write. Returns the updated document, or
    /// `None` when the id does not exist.
    async fn mutate(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Option<JsonValue>, Error>;

    /// Returns false when the document does not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error>;

    /// Every document in the collection, in stable (id) order.
    async fn scan(&self, collection: &str) -> Result<Vec<JsonValue>, Error>;
}
