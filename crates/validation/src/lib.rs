//! # ottoman-validation
//!
//! Rule-based validation for schema-less JSON documents. A [`Schema`] maps
//! field names to lists of [`Rule`]s; [`validate`] runs a document's
//! attribute mapping through a schema and returns a flat list of
//! [`ValidationError`] descriptors, where an empty list means the document
//! is valid.
//!
//! The crate is deliberately free-standing: the ODM layer treats it as an
//! opaque validator and only depends on the `validate` contract.

pub mod error;
pub mod rules;

pub use error::ValidationError;
pub use rules::{validate, Rule, Schema, ValueKind};
