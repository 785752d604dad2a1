//! Model instances
//!
//! One `Model` represents one document: a typed handle over an exclusively
//! owned attribute store, with validation and the CRUD lifecycle against a
//! [`DocumentStore`]. Instances are detached in-memory representations;
//! after any operation the store may move on, and observing external changes
//! requires a re-fetch.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use ottoman_validation::{validate, ValidationError};

use crate::attributes::{Attributes, TYPE_FIELD};
use crate::definition::ModelDef;
use crate::error::{OdmError, OdmResult};
use crate::store::DocumentStore;

/// A typed document instance
#[derive(Clone)]
pub struct Model {
    def: Arc<ModelDef>,
    attributes: Attributes,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("type", &self.def.name())
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// JS-style truthiness over JSON values; `_id`/`_rev` count as present only
/// when truthy
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Model {
    /// Empty instance of a type; construction goes through
    /// [`ModelDef::build`] so defaults and the initialize hook apply
    pub(crate) fn bare(def: Arc<ModelDef>) -> Self {
        Self {
            def,
            attributes: Attributes::new(),
        }
    }

    /// The definition this instance was constructed from
    pub fn definition(&self) -> &Arc<ModelDef> {
        &self.def
    }

    /// The registered type name
    pub fn type_name(&self) -> &str {
        self.def.name()
    }

    /// Read-only view of the attribute store
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Borrow one attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set one attribute; the reserved discriminator is rejected
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> OdmResult<()> {
        self.attributes.set(key, value)
    }

    /// Merge many attributes, overwriting on collision
    pub fn set_many(&mut self, attributes: Map<String, Value>) -> OdmResult<()> {
        self.attributes.merge(attributes)
    }

    /// Attribute presence, including explicit nulls
    pub fn has(&self, key: &str) -> bool {
        self.attributes.has(key)
    }

    /// Remove an attribute, returning whether it was present
    pub fn unset(&mut self, key: &str) -> bool {
        self.attributes.unset(key)
    }

    /// Remove every attribute
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    /// Detached snapshot of the attributes, safe for independent mutation
    pub fn to_json(&self) -> Map<String, Value> {
        self.attributes.snapshot()
    }

    /// The `_id` attribute, when it is a string
    pub fn id(&self) -> Option<&str> {
        self.get("_id").and_then(Value::as_str)
    }

    /// The `_rev` revision token, when it is a string
    pub fn rev(&self) -> Option<&str> {
        self.get("_rev").and_then(Value::as_str)
    }

    /// True unless the instance has both a truthy `_id` and a truthy `_rev`,
    /// i.e. unless it has been successfully persisted at least once
    pub fn is_new(&self) -> bool {
        let persisted = |key: &str| self.get(key).map(truthy).unwrap_or(false);
        !(persisted("_id") && persisted("_rev"))
    }

    /// Run the attributes through the type's schema. `None` means valid —
    /// or schema-less, which disables validation. Never cached; `save`
    /// re-runs this on every call.
    pub fn validate(&self) -> Option<Vec<ValidationError>> {
        let schema = self.def.schema()?;
        let errors = validate(self.attributes.as_map(), schema);
        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }

    /// True iff [`Model::validate`] yields no errors
    pub fn is_valid(&self) -> bool {
        self.validate().is_none()
    }

    /// Probe the store for this instance's document.
    ///
    /// Resolves to the current revision token when the document exists and
    /// to `None` on the store's not-found status; any other store failure
    /// propagates.
    pub async fn exists(&self, store: &dyn DocumentStore) -> OdmResult<Option<String>> {
        let id = self.id().ok_or(OdmError::MissingId {
            operation: "probe existence",
        })?;
        match store.head(id).await {
            Ok(head) => Ok(Some(head.etag.trim_matches('"').to_string())),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Replace all attributes with the stored document (full replace, not
    /// merge). The wire discriminator is stripped before exposure.
    pub async fn fetch(&mut self, store: &dyn DocumentStore) -> OdmResult<()> {
        let id = self
            .id()
            .ok_or(OdmError::MissingId { operation: "fetch" })?
            .to_string();
        let mut document = store.get(&id).await?;
        document.remove(TYPE_FIELD);

        self.attributes.clear();
        self.attributes.merge(document)?;
        tracing::debug!("fetched {} \"{}\"", self.type_name(), id);
        Ok(())
    }

    /// Validate, then upsert the attribute snapshot stamped with this type's
    /// discriminator.
    ///
    /// Validation errors surface as [`OdmError::Validation`] before any
    /// store call. A store conflict on a never-persisted instance becomes
    /// [`OdmError::Uniqueness`]; the same conflict on an existing instance
    /// is a stale-revision failure and propagates as the plain store error.
    /// A transport-level success with `ok == false` is
    /// [`OdmError::Database`]. On success `_id` and `_rev` are overwritten
    /// with the store-assigned values.
    pub async fn save(&mut self, store: &dyn DocumentStore) -> OdmResult<()> {
        if let Some(errors) = self.validate() {
            return Err(OdmError::Validation { errors });
        }

        let mut document = self.to_json();
        document.insert(
            TYPE_FIELD.to_string(),
            Value::String(self.def.name().to_string()),
        );

        let receipt = match store.insert(document, self.id()).await {
            Ok(receipt) => receipt,
            // Newness is judged here, at error-handling time, not at send
            // time; see DESIGN.md on the inherited classification race.
            Err(error) if error.is_conflict() && self.is_new() => {
                return Err(OdmError::Uniqueness {
                    id: self.id().unwrap_or_default().to_string(),
                });
            }
            Err(error) => return Err(error.into()),
        };
        if !receipt.ok {
            return Err(OdmError::Database { response: receipt });
        }

        tracing::debug!(
            "saved {} \"{}\" at revision {}",
            self.type_name(),
            receipt.id,
            receipt.rev
        );
        self.attributes.set("_id", receipt.id)?;
        self.attributes.set("_rev", receipt.rev)?;
        Ok(())
    }

    /// Delete the document at this instance's current revision.
    ///
    /// Requires both id and revision: deletes are optimistic-concurrency
    /// writes keyed by `_rev`. On success `_id`/`_rev` are overwritten with
    /// the store-assigned values (the tombstone revision) and `_deleted` is
    /// set true.
    pub async fn destroy(&mut self, store: &dyn DocumentStore) -> OdmResult<()> {
        let id = self
            .id()
            .ok_or(OdmError::MissingId {
                operation: "destroy",
            })?
            .to_string();
        let rev = self
            .rev()
            .ok_or(OdmError::MissingRev {
                operation: "destroy",
            })?
            .to_string();

        let receipt = store.destroy(&id, &rev).await?;
        if !receipt.ok {
            return Err(OdmError::Database { response: receipt });
        }

        tracing::debug!("destroyed {} \"{}\"", self.type_name(), receipt.id);
        self.attributes.set("_id", receipt.id)?;
        self.attributes.set("_rev", receipt.rev)?;
        self.attributes.set("_deleted", true)?;
        Ok(())
    }
}
