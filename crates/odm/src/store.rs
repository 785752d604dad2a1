//! Document-store client contract
//!
//! Abstracts the remote document database behind a small async trait so the
//! mapping layer never touches the transport. Implementations are expected to
//! follow CouchDB conventions: per-document revision tokens, a distinguished
//! 404 status for missing documents, a distinguished 409 status for update
//! conflicts, and server-side views addressed by design-document and view
//! name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A failure reported by the document store.
///
/// Carries the HTTP-like status code when the store supplied one; the mapping
/// layer only ever inspects the not-found and conflict classes and propagates
/// everything else unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("document store error: {message}")]
pub struct StoreError {
    /// HTTP-like status code, when the store reported one
    pub status: Option<u16>,
    /// Human-readable description of the failure
    pub message: String,
}

impl StoreError {
    /// Create a store error without a status code
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Create a store error with a status code
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A 404 for the given document id
    pub fn not_found(id: &str) -> Self {
        Self::with_status(404, format!("no document with id \"{}\"", id))
    }

    /// A 409 update conflict for the given document id
    pub fn conflict(id: &str) -> Self {
        Self::with_status(409, format!("document update conflict on \"{}\"", id))
    }

    /// True for the store's not-found status class
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// True for the store's duplicate-key / stale-revision conflict class
    pub fn is_conflict(&self) -> bool {
        self.status == Some(409)
    }
}

/// Response headers from a lightweight existence probe.
///
/// The revision travels in an ETag-style quoted string; callers strip the
/// quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHead {
    /// Quoted revision token, e.g. `"1-6f5ac"`
    pub etag: String,
}

/// Acknowledgement returned by the store for writes and deletes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Application-level success flag; transport success with `ok == false`
    /// is still a failure
    pub ok: bool,
    /// Document id, assigned by the store when the caller supplied none
    pub id: String,
    /// Revision token assigned by this write
    pub rev: String,
}

/// Options for a server-side view invocation, fixed at query construction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewOptions {
    /// Restrict the result set to rows with exactly this key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    /// Ask the store to attach the full document to each row
    pub include_docs: bool,
    /// Maximum number of rows to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// One row of a view result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRow {
    /// Id of the document that emitted the row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The emitted key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    /// The emitted value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Full document, present when the view was invoked with `include_docs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<Map<String, Value>>,
}

/// A view result set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewResult {
    /// Total number of rows in the whole view, not the filtered result
    pub total_rows: u64,
    /// Position of the first returned row within the view
    pub offset: u64,
    /// The returned rows, in view order
    pub rows: Vec<ViewRow>,
}

/// Async client contract for a revision-versioned document store.
///
/// All mapping-layer persistence and querying goes through this trait; each
/// call is one independent round trip with no retries, caching or pooling at
/// this layer.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lightweight existence probe; the current revision travels in the
    /// ETag header. Missing documents are a 404-class [`StoreError`].
    async fn head(&self, id: &str) -> StoreResult<DocumentHead>;

    /// Fetch a full document by id
    async fn get(&self, id: &str) -> StoreResult<Map<String, Value>>;

    /// Upsert a document. Passing no id asks the store to assign one.
    /// Duplicate ids and stale `_rev` tokens are 409-class errors.
    async fn insert(
        &self,
        document: Map<String, Value>,
        id: Option<&str>,
    ) -> StoreResult<WriteReceipt>;

    /// Delete a document at a specific revision
    async fn destroy(&self, id: &str, rev: &str) -> StoreResult<WriteReceipt>;

    /// Invoke a server-side view under a design document
    async fn view(&self, design: &str, view: &str, options: &ViewOptions)
        -> StoreResult<ViewResult>;
}
