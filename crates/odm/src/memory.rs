//! In-memory document store
//!
//! A complete [`DocumentStore`] with CouchDB-style semantics: per-document
//! revision tokens, 404 for missing documents, 409 for duplicate ids and
//! stale revisions, store-assigned ids, and field-indexed views. Backs the
//! integration tests and serves as a reference for transport
//! implementations; it adds no durability and no concurrency coordination
//! beyond per-entry atomicity.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::store::{
    DocumentHead, DocumentStore, StoreError, StoreResult, ViewOptions, ViewResult, ViewRow,
    WriteReceipt,
};

#[derive(Debug, Clone)]
struct StoredDocument {
    rev: String,
    /// User fields only; `_id` and `_rev` are attached on read
    fields: Map<String, Value>,
}

/// In-process document store with revisioned writes and indexed views
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, StoredDocument>,
    /// "design/view" -> indexed field name
    views: DashMap<String, String>,
    tick: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view under `design` that emits one row per document
    /// containing `field`, keyed by that field's value and ordered by key,
    /// then by document id
    pub fn index_view(&self, design: &str, view: &str, field: &str) {
        self.views
            .insert(view_slot(design, view), field.to_string());
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn next_rev(&self, generation: u64) -> String {
        let tick = self.tick.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        format!("{}-{:08x}", generation, tick)
    }
}

fn view_slot(design: &str, view: &str) -> String {
    format!("{}/{}", design, view)
}

fn generation(rev: &str) -> u64 {
    rev.split('-')
        .next()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0)
}

/// CouchDB-like collation, reduced to the value shapes view keys take here:
/// null < bool < number < string < array < object, with same-kind values
/// compared naturally
fn compare_keys(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(left)
            .cmp(&rank(right))
            .then_with(|| left.to_string().cmp(&right.to_string())),
    }
}

fn full_document(id: &str, stored: &StoredDocument) -> Map<String, Value> {
    let mut document = stored.fields.clone();
    document.insert("_id".to_string(), Value::String(id.to_string()));
    document.insert("_rev".to_string(), Value::String(stored.rev.clone()));
    document
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn head(&self, id: &str) -> StoreResult<DocumentHead> {
        match self.documents.get(id) {
            Some(stored) => Ok(DocumentHead {
                etag: format!("\"{}\"", stored.rev),
            }),
            None => Err(StoreError::not_found(id)),
        }
    }

    async fn get(&self, id: &str) -> StoreResult<Map<String, Value>> {
        match self.documents.get(id) {
            Some(stored) => Ok(full_document(id, stored.value())),
            None => Err(StoreError::not_found(id)),
        }
    }

    async fn insert(
        &self,
        mut document: Map<String, Value>,
        id: Option<&str>,
    ) -> StoreResult<WriteReceipt> {
        let supplied_rev = document
            .remove("_rev")
            .and_then(|value| value.as_str().map(str::to_string));
        document.remove("_id");

        let id = match id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let rev = match self.documents.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                if supplied_rev.as_deref() != Some(slot.get().rev.as_str()) {
                    return Err(StoreError::conflict(&id));
                }
                let rev = self.next_rev(generation(&slot.get().rev) + 1);
                slot.insert(StoredDocument {
                    rev: rev.clone(),
                    fields: document,
                });
                rev
            }
            Entry::Vacant(slot) => {
                if supplied_rev.is_some() {
                    // updating a document that does not exist
                    return Err(StoreError::conflict(&id));
                }
                let rev = self.next_rev(1);
                slot.insert(StoredDocument {
                    rev: rev.clone(),
                    fields: document,
                });
                rev
            }
        };

        Ok(WriteReceipt { ok: true, id, rev })
    }

    async fn destroy(&self, id: &str, rev: &str) -> StoreResult<WriteReceipt> {
        match self.documents.entry(id.to_string()) {
            Entry::Occupied(slot) => {
                if slot.get().rev != rev {
                    return Err(StoreError::conflict(id));
                }
                let tombstone = self.next_rev(generation(rev) + 1);
                slot.remove();
                Ok(WriteReceipt {
                    ok: true,
                    id: id.to_string(),
                    rev: tombstone,
                })
            }
            Entry::Vacant(_) => Err(StoreError::not_found(id)),
        }
    }

    async fn view(
        &self,
        design: &str,
        view: &str,
        options: &ViewOptions,
    ) -> StoreResult<ViewResult> {
        let slot = view_slot(design, view);
        let field = match self.views.get(&slot) {
            Some(field) => field.value().clone(),
            None => {
                return Err(StoreError::with_status(
                    404,
                    format!("no view named \"{}\"", slot),
                ))
            }
        };

        let mut entries: Vec<(Value, String)> = self
            .documents
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .fields
                    .get(&field)
                    .map(|key| (key.clone(), entry.key().clone()))
            })
            .collect();
        entries.sort_by(|a, b| compare_keys(&a.0, &b.0).then_with(|| a.1.cmp(&b.1)));

        let total_rows = entries.len() as u64;
        let offset = match &options.key {
            Some(key) => entries
                .iter()
                .position(|(emitted, _)| emitted == key)
                .unwrap_or(entries.len()) as u64,
            None => 0,
        };

        let matching = entries
            .into_iter()
            .filter(|(emitted, _)| match &options.key {
                Some(key) => emitted == key,
                None => true,
            });
        let limited: Vec<(Value, String)> = match options.limit {
            Some(limit) => matching.take(limit as usize).collect(),
            None => matching.collect(),
        };

        let rows = limited
            .into_iter()
            .map(|(key, id)| {
                let doc = if options.include_docs {
                    self.documents
                        .get(&id)
                        .map(|stored| full_document(&id, stored.value()))
                } else {
                    None
                };
                ViewRow {
                    id: Some(id),
                    key: Some(key),
                    value: None,
                    doc,
                }
            })
            .collect();

        Ok(ViewResult {
            total_rows,
            offset,
            rows,
        })
    }
}
