//! # ottoman-odm: object-document mapping for revision-versioned stores
//!
//! Maps schema-less, type-tagged documents from a CouchDB-style store onto
//! registered model types. Model types are defined once at startup through
//! [`define`], instances are mutated through their attribute store, validated
//! against an optional schema, and persisted with optimistic concurrency via
//! the store's revision tokens. Server-side views are queried through
//! [`ModelDef::get_model`] / [`ModelDef::get_collection`], whose results are
//! hydrated back into typed [`Model`] instances keyed by each document's
//! discriminator field.
//!
//! The network transport stays behind the [`DocumentStore`] trait; an
//! in-process [`MemoryStore`] with the same semantics ships for tests and
//! prototyping.

pub mod attributes;
pub mod collection;
pub mod definition;
pub mod error;
pub mod memory;
pub mod model;
pub mod query;
pub mod registry;
pub mod store;

// Re-export core types
pub use attributes::{Attributes, TYPE_FIELD};
pub use collection::Collection;
pub use definition::{Definition, ModelDef};
pub use error::{OdmError, OdmResult, ViewError};
pub use memory::MemoryStore;
pub use model::Model;
pub use query::{CollectionQuery, ModelQuery, ViewQuery};
pub use registry::define;
pub use store::{
    DocumentHead, DocumentStore, StoreError, StoreResult, ViewOptions, ViewResult, ViewRow,
    WriteReceipt,
};

// Validator re-exports so callers can build schemas without a direct
// dependency on the validation crate
pub use ottoman_validation::{Rule, Schema, ValidationError, ValueKind};
