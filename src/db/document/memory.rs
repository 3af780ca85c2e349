//! In-memory document emulator.
//!
//! A process-local map from collection name to an insertion-ordered list of
//! plain JSON records. No index: every lookup is a linear scan. Nothing is
//! durable; the store vanishes with the process.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::db::repository::DocumentBackend;
use crate::db::utils::generate_identity;
use crate::db::{DbError, DbResult, DocumentKind, Filter, FindOrder, Id};

const ID_FIELD: &str = "_id";

/// Textual form of an identity value, so `42` and `"42"` compare equal.
pub(crate) fn identity_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn has_identity(record: &Value, id: &str) -> bool {
    record
        .get(ID_FIELD)
        .and_then(identity_text)
        .is_some_and(|stored| stored == id)
}

/// Shared handle to the in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw record to a collection.
    pub fn seed(&self, collection: &str, record: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Snapshot of a collection in insertion order.
    pub fn all(&self, collection: &str) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// First record whose `key` field equals `value` exactly.
    pub fn find_first(&self, collection: &str, key: &str, value: &Value) -> Option<Value> {
        self.collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|record| record.get(key) == Some(value))
                .cloned()
        })
    }

    /// Record whose identity matches `id` textually.
    pub fn find_by_identity(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections.get(collection).and_then(|records| {
            records
                .iter()
                .find(|record| has_identity(record, id))
                .cloned()
        })
    }

    /// Overwrite the record sharing `record`'s identity. Returns whether one was found.
    pub fn replace_by_identity(&self, collection: &str, id: &str, record: Value) -> bool {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return false;
        };
        match records.iter_mut().find(|existing| has_identity(existing, id)) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Remove every record carrying identity `id`. Returns how many were removed.
    pub fn remove_by_identity(&self, collection: &str, id: &str) -> usize {
        let Some(mut records) = self.collections.get_mut(collection) else {
            return 0;
        };
        let before = records.len();
        records.retain(|record| !has_identity(record, id));
        before - records.len()
    }

    pub fn clear(&self) {
        self.collections.clear();
    }
}

impl DocumentBackend for MemoryStore {
    async fn find<T: DocumentKind>(&self, filter: &Filter, order: FindOrder) -> DbResult<Vec<T>> {
        if !filter.is_empty() {
            debug!(
                collection = T::COLLECTION,
                "filter ignored by the in-memory store; returning every record"
            );
        }

        let mut records = self.all(T::COLLECTION);
        if order == FindOrder::NewestFirst {
            records.reverse();
        }

        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(DbError::from))
            .collect()
    }

    async fn find_one<T: DocumentKind>(&self, filter: &Filter) -> DbResult<Option<T>> {
        let record = match filter.first() {
            Some((key, value)) => self.find_first(T::COLLECTION, key, value),
            None => self.all(T::COLLECTION).into_iter().next(),
        };
        record
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    async fn find_by_id<T: DocumentKind>(&self, id: &str) -> DbResult<Option<T>> {
        self.find_by_identity(T::COLLECTION, id)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    async fn count<T: DocumentKind>(&self) -> DbResult<u64> {
        Ok(self.len(T::COLLECTION) as u64)
    }

    async fn insert<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        self.seed(T::COLLECTION, serde_json::to_value(record)?);
        Ok(())
    }

    async fn replace<T: DocumentKind>(&self, record: &T) -> DbResult<()> {
        let value = serde_json::to_value(record)?;
        if !self.replace_by_identity(T::COLLECTION, record.id(), value) {
            debug!(
                collection = T::COLLECTION,
                id = record.id(),
                "replace matched no record"
            );
        }
        Ok(())
    }

    async fn delete<T: DocumentKind>(&self, id: &str) -> DbResult<()> {
        self.remove_by_identity(T::COLLECTION, id);
        Ok(())
    }

    fn next_identity(&self) -> Id {
        generate_identity().to_string()
    }
}
