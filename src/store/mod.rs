//! Document store abstraction
//!
//! Teams live in a schemaless document store. This module defines the narrow
//! capability the repository needs: list with an optional equality filter and
//! ordering, get by id, create, and an atomic combined update that mixes plain
//! field sets with array appends.

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub mod firestore;
#[cfg(test)]
pub mod mock;
pub mod sqlite;

pub use firestore::FirestoreStore;
#[cfg(test)]
pub use mock::MockStore;
pub use sqlite::SqliteStore;

/// Field map of a stored document
pub type Fields = Map<String, Value>;

/// A stored document: its store-assigned id plus raw fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Read query: at most one equality filter and one descending ordering field.
///
/// Kept to a single field each so hosted backends never need a composite index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<(String, Value)>,
    pub order_desc: Option<String>,
}

impl Query {
    /// Unfiltered, unordered query
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to documents whose `field` equals `value`
    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter = Some((field.to_string(), value.into()));
        self
    }

    /// Order results by `field`, largest first
    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.order_desc = Some(field.to_string());
        self
    }

    /// Whether a document passes the equality filter
    pub fn matches(&self, fields: &Fields) -> bool {
        match &self.filter {
            None => true,
            Some((field, expected)) => fields.get(field) == Some(expected),
        }
    }

    /// Sort documents in place by the ordering field, if any.
    ///
    /// Backends without native ordering use this after fetching.
    pub fn sort(&self, docs: &mut [Document]) {
        if let Some(field) = &self.order_desc {
            docs.sort_by(|a, b| compare_values(b.fields.get(field), a.fields.get(field)));
        }
    }
}

/// Order two optional JSON values. Missing sorts first, numbers before strings.
///
/// Two RFC 3339 strings compare as instants, so fractional seconds of
/// differing precision still order correctly.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Number(_)), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Number(_))) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// A single field change within an [`Update`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Overwrite the field with a value
    Set(String, Value),
    /// Append each value not already present in the array field
    Append(String, Vec<Value>),
}

/// Combined update applied atomically: either every op lands or none does
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub ops: Vec<FieldOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.ops.push(FieldOp::Set(field.to_string(), value.into()));
        self
    }

    pub fn append(mut self, field: &str, values: Vec<Value>) -> Self {
        self.ops.push(FieldOp::Append(field.to_string(), values));
        self
    }

    /// Apply every op to an in-memory field map.
    ///
    /// Appends skip values already present, and a non-array field is replaced
    /// by a fresh array.
    pub fn apply_to(&self, fields: &mut Fields) {
        for op in &self.ops {
            match op {
                FieldOp::Set(field, value) => {
                    fields.insert(field.clone(), value.clone());
                }
                FieldOp::Append(field, values) => {
                    let entry = fields
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    if !entry.is_array() {
                        *entry = Value::Array(Vec::new());
                    }
                    if let Value::Array(items) = entry {
                        for value in values {
                            if !items.contains(value) {
                                items.push(value.clone());
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Capability offered by a document store backend.
///
/// Every method is a single round trip. `update` must apply all of its ops
/// atomically, and its appends must be safe under concurrent writers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List documents in a collection
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// Fetch one document, `None` when it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Create a document and return its assigned id
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Apply a combined update to an existing document.
    ///
    /// Fails with `StoreError::NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, update: &Update) -> Result<()>;
}
