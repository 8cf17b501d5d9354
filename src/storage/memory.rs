//! In-memory document store, used by the integration tests and for
//! running the API without a database.

use crate::domain::error::Error;
use crate::storage::document::{DocumentStore, Mutation};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    // collection -> id -> document; BTreeMap keeps scan order stable.
    collections: RwLock<HashMap<String, BTreeMap<String, JsonValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: &str, doc: JsonValue) -> Result<(), Error> {
        let mut guard = self.collections.write().await;
        let coll = guard.entry(collection.to_string()).or_default();
        if coll.contains_key(id) {
            return Err(Error::conflict(format!(
                "document {} already exists in {}",
                id, collection
            )));
        }
        coll.insert(id.to_string(), doc);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<JsonValue>, Error> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn put(&self, collection: &str, id: &str, doc: JsonValue) -> Result<bool, Error> {
        let mut guard = self.collections.write().await;
        match guard.get_mut(collection).and_then(|c| c.get_mut(id)) {
            Some(slot) => {
                *slot = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mutate(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Option<JsonValue>, Error> {
        // The write lock is the critical section: no other mutation can
        // interleave between the read and the write-back.
        let mut guard = self.collections.write().await;
        let Some(slot) = guard.get_mut(collection).and_then(|c| c.get_mut(id)) else {
            return Ok(None);
        };
        let updated = mutation(slot.clone())?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
        let mut guard = self.collections.write().await;
        Ok(guard
            .get_mut(collection)
            .map(|c| c.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn scan(&self, collection: &str) -> Result<Vec<JsonValue>, Error> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }
}
