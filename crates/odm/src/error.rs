//! Error types for the mapping layer
//!
//! Local precondition failures, validation failures, and hydration failures
//! get their own kinds; anything the store reports that this layer does not
//! reinterpret propagates unchanged as [`OdmError::Store`].

use serde_json::{Map, Value};
use thiserror::Error;

use ottoman_validation::ValidationError;

use crate::store::{StoreError, ViewOptions, ViewResult, ViewRow, WriteReceipt};

/// Result type alias for mapping-layer operations
pub type OdmResult<T> = Result<T, OdmError>;

/// Error kinds surfaced by the mapping layer
#[derive(Debug, Error)]
pub enum OdmError {
    /// A model type was defined twice under the same name. Fatal at
    /// definition time; the registry keeps the first definition.
    #[error("model \"{name}\" is already defined")]
    AlreadyDefined { name: String },

    /// An attempt to write the reserved discriminator field. The
    /// persistence layer stamps it on save; callers never supply it.
    #[error("attribute \"{key}\" is reserved and assigned on save")]
    ReservedAttribute { key: String },

    /// The operation needs an id the instance does not have
    #[error("model has no id; cannot {operation}")]
    MissingId { operation: &'static str },

    /// The operation needs a revision token the instance does not have
    #[error("model has no revision; cannot {operation}")]
    MissingRev { operation: &'static str },

    /// Schema validation failed; no store call was made
    #[error("validation failed with {} error(s)", errors.len())]
    Validation { errors: Vec<ValidationError> },

    /// A brand-new instance tried to claim an id the store already holds
    #[error("id \"{id}\" already exists")]
    Uniqueness { id: String },

    /// The store answered the call but flagged the operation as failed
    #[error("document store rejected the operation for \"{}\"", response.id)]
    Database { response: WriteReceipt },

    /// Hydration of a view result failed
    #[error(transparent)]
    View(#[from] ViewError),

    /// Any store failure this layer does not reinterpret
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while turning raw view rows into model instances
#[derive(Debug, Error)]
pub enum ViewError {
    /// The row's discriminator names no registered model type
    #[error("unknown document type \"{type_name}\"")]
    UnknownType {
        type_name: String,
        document: Map<String, Value>,
    },

    /// A single-result query matched more than one document; ambiguity is
    /// an error, never "pick first"
    #[error("Multiple documents found")]
    MultipleDocuments {
        options: ViewOptions,
        results: ViewResult,
    },

    /// The row carried no document, e.g. the store ignored `include_docs`
    #[error("view row {} is missing its document", row.id.as_deref().unwrap_or("<no id>"))]
    MissingDocument { row: ViewRow },

    /// The invoked view name is not declared on the model type
    #[error("view \"{view}\" is not declared on design document \"{design}\"")]
    UndeclaredView { design: String, view: String },
}
