//! Mock document store for testing
//!
//! Keeps documents in memory and records every call so tests can assert on
//! how many round trips an operation made and what it wrote.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Document, DocumentStore, Fields, Query, Update};
use crate::error::{Result, StoreError};

/// Mock store for tests.
///
/// Seed documents with [`MockStore::with_document`], queue failures with
/// [`MockStore::fail_next`], then inspect [`MockStore::call_counts`].
pub struct MockStore {
    /// Documents per collection, in insertion order
    docs: Arc<Mutex<Vec<(String, Document)>>>,
    /// Errors returned by the next calls, one per call
    errors: Arc<Mutex<VecDeque<StoreError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Updates received, in order
    updates: Arc<Mutex<Vec<(String, Update)>>>,
    /// Counter for generated ids
    next_id: Arc<Mutex<usize>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            docs: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            updates: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(0)),
        }
    }
}

/// Tracks store call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
}

impl CallCounts {
    /// Total number of store calls made.
    pub fn total(&self) -> usize {
        self.list + self.get + self.create + self.update
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document into a collection.
    pub async fn with_document(self, collection: &str, id: &str, fields: serde_json::Value) -> Self {
        let fields = fields.as_object().cloned().unwrap_or_default();
        self.docs.lock().await.push((
            collection.to_string(),
            Document {
                id: id.to_string(),
                fields,
            },
        ));
        self
    }

    /// Make the next `times` calls fail with a copy of `error`.
    pub async fn fail_next(self, times: usize, error: fn() -> StoreError) -> Self {
        let mut errors = self.errors.lock().await;
        for _ in 0..times {
            errors.push_back(error());
        }
        drop(errors);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Updates received so far.
    pub async fn updates(&self) -> Vec<(String, Update)> {
        self.updates.lock().await.clone()
    }

    /// Raw fields of a stored document.
    pub async fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        self.docs
            .lock()
            .await
            .iter()
            .find(|(c, d)| c == collection && d.id == id)
            .map(|(_, d)| d.fields.clone())
    }

    /// Pop a queued error, if any.
    async fn check_error(&self) -> Result<()> {
        if let Some(e) = self.errors.lock().await.pop_front() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        self.call_count.lock().await.list += 1;
        self.check_error().await?;

        let mut docs: Vec<Document> = self
            .docs
            .lock()
            .await
            .iter()
            .filter(|(c, d)| c == collection && query.matches(&d.fields))
            .map(|(_, d)| d.clone())
            .collect();
        query.sort(&mut docs);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.call_count.lock().await.get += 1;
        self.check_error().await?;

        Ok(self
            .docs
            .lock()
            .await
            .iter()
            .find(|(c, d)| c == collection && d.id == id)
            .map(|(_, d)| d.clone()))
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        self.call_count.lock().await.create += 1;
        self.check_error().await?;

        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let id = format!("mock-team-{}", *next_id);
        drop(next_id);

        self.docs.lock().await.push((
            collection.to_string(),
            Document {
                id: id.clone(),
                fields,
            },
        ));
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, update: &Update) -> Result<()> {
        self.call_count.lock().await.update += 1;
        self.check_error().await?;

        // Single lock held for the whole apply, so the update is atomic
        let mut docs = self.docs.lock().await;
        let doc = docs
            .iter_mut()
            .find(|(c, d)| c == collection && d.id == id)
            .map(|(_, d)| d)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
        update.apply_to(&mut doc.fields);
        drop(docs);

        self.updates
            .lock()
            .await
            .push((id.to_string(), update.clone()));
        Ok(())
    }
}
