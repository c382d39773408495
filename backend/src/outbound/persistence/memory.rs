//! In-process [`CollectionAccessor`] used by tests and local demos.
//!
//! Collections are vectors of JSON documents behind a Tokio `RwLock`, kept in
//! insertion order. Failures can be injected per collection to exercise error
//! paths without a live store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ensure_id;
use crate::domain::ports::{
    Collection, CollectionAccessor, DatabaseError, Document, Filter, UpdateSummary,
};

/// Deterministic in-memory document store.
#[derive(Debug, Default)]
pub struct InMemoryCollectionAccessor {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    failures: RwLock<HashMap<Collection, DatabaseError>>,
}

impl InMemoryCollectionAccessor {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `documents` per collection.
    pub fn seeded(documents: impl IntoIterator<Item = (Collection, Vec<Document>)>) -> Self {
        Self {
            collections: RwLock::new(documents.into_iter().collect()),
            failures: RwLock::default(),
        }
    }

    /// Append documents to `collection`.
    pub async fn seed(&self, collection: Collection, documents: impl IntoIterator<Item = Document>) {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .extend(documents);
    }

    /// Snapshot of every document in `collection`.
    pub async fn documents(&self, collection: Collection) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every operation on `collection` fail with `error` until
    /// [`InMemoryCollectionAccessor::recover`] is called.
    pub async fn fail_with(&self, collection: Collection, error: DatabaseError) {
        self.failures.write().await.insert(collection, error);
    }

    /// Clear an injected failure.
    pub async fn recover(&self, collection: Collection) {
        self.failures.write().await.remove(&collection);
    }

    async fn check(&self, collection: Collection) -> Result<(), DatabaseError> {
        match self.failures.read().await.get(&collection) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CollectionAccessor for InMemoryCollectionAccessor {
    async fn find_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, DatabaseError> {
        self.check(collection).await?;
        let guard = self.collections.read().await;
        Ok(guard
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

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<String, DatabaseError> {
        self.check(collection).await?;
        let id = ensure_id(&mut document);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateSummary, DatabaseError> {
        self.check(collection).await?;
        let mut guard = self.collections.write().await;
        let Some(target) = guard
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|document| filter.matches(document)))
        else {
            return Ok(UpdateSummary::default());
        };

        let mut changed = false;
        for (field, value) in patch {
            if target.get(&field) != Some(&value) {
                target.insert(field, value);
                changed = true;
            }
        }
        Ok(UpdateSummary {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, DatabaseError> {
        self.check(collection).await?;
        let mut guard = self.collections.write().await;
        let Some(documents) = guard.get_mut(&collection) else {
            return Ok(0);
        };
        match documents.iter().position(|document| filter.matches(document)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
