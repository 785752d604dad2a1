//! Attribute store
//!
//! The mutable field mapping owned by exactly one model instance. The
//! container itself never escapes its owner, and the reserved discriminator
//! field can never be written through the mutation path: the persistence
//! layer stamps it onto outgoing snapshots and hydration strips it from
//! incoming documents, so a live attribute store never contains it.

use serde_json::{Map, Value};

use crate::error::{OdmError, OdmResult};

/// Reserved discriminator field naming a document's model type on the wire
pub const TYPE_FIELD: &str = "type";

/// Mutable, order-preserving mapping from field names to JSON values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    fields: Map<String, Value>,
}

impl Attributes {
    /// Create an empty attribute store
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a field's value, `None` when the key is absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set one field. Writing the reserved discriminator fails with
    /// [`OdmError::ReservedAttribute`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> OdmResult<()> {
        let key = key.into();
        if key == TYPE_FIELD {
            return Err(OdmError::ReservedAttribute { key });
        }
        self.fields.insert(key, value.into());
        Ok(())
    }

    /// Merge a mapping of fields, overwriting on key collision and leaving
    /// untouched keys in place. Rejects the whole mapping before applying
    /// any key when it contains the reserved discriminator.
    pub fn merge(&mut self, attributes: Map<String, Value>) -> OdmResult<()> {
        if attributes.contains_key(TYPE_FIELD) {
            return Err(OdmError::ReservedAttribute {
                key: TYPE_FIELD.to_string(),
            });
        }
        for (key, value) in attributes {
            self.fields.insert(key, value);
        }
        Ok(())
    }

    /// Key presence, including keys explicitly set to null
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Remove a key, returning whether it was present
    pub fn unset(&mut self, key: &str) -> bool {
        self.fields.remove(key).is_some()
    }

    /// Remove every key
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Detached shallow copy of the mapping, safe for independent mutation
    pub fn snapshot(&self) -> Map<String, Value> {
        self.fields.clone()
    }

    /// Read-only view of the live mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in insertion-independent map order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get() {
        let mut attributes = Attributes::new();
        attributes.set("location", "couch").unwrap();
        assert_eq!(attributes.get("location"), Some(&json!("couch")));
        assert_eq!(attributes.get("missing"), None);
    }

    #[test]
    fn merge_overwrites_and_keeps_untouched_keys() {
        let mut attributes = Attributes::new();
        attributes.set("location", "couch").unwrap();
        attributes.set("scary", true).unwrap();

        let mut incoming = Map::new();
        incoming.insert("scary".into(), json!(false));
        incoming.insert("teeth".into(), json!("sharp"));
        attributes.merge(incoming).unwrap();

        assert_eq!(attributes.get("location"), Some(&json!("couch")));
        assert_eq!(attributes.get("scary"), Some(&json!(false)));
        assert_eq!(attributes.get("teeth"), Some(&json!("sharp")));
    }

    #[test]
    fn discriminator_is_not_settable() {
        let mut attributes = Attributes::new();
        let error = attributes.set(TYPE_FIELD, "Monster").unwrap_err();
        assert!(matches!(error, OdmError::ReservedAttribute { key } if key == TYPE_FIELD));
        assert!(!attributes.has(TYPE_FIELD));
    }

    #[test]
    fn merge_with_discriminator_applies_nothing() {
        let mut attributes = Attributes::new();
        let mut incoming = Map::new();
        incoming.insert("friendly".into(), json!(true));
        incoming.insert(TYPE_FIELD.into(), json!("Monster"));

        assert!(attributes.merge(incoming).is_err());
        assert!(attributes.is_empty());
    }

    #[test]
    fn has_is_presence_not_truthiness() {
        let mut attributes = Attributes::new();
        attributes.set("friendly", Value::Null).unwrap();
        assert!(attributes.has("friendly"));
        assert!(!attributes.has("scary"));
    }

    #[test]
    fn unset_reports_prior_presence() {
        let mut attributes = Attributes::new();
        attributes.set("location", "couch").unwrap();

        assert!(attributes.unset("location"));
        assert!(!attributes.has("location"));
        assert!(!attributes.unset("location"));
    }

    #[test]
    fn clear_removes_everything() {
        let mut attributes = Attributes::new();
        attributes.set("location", "couch").unwrap();
        attributes.set("scary", true).unwrap();

        attributes.clear();
        assert!(attributes.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut attributes = Attributes::new();
        attributes.set("location", "couch").unwrap();

        let mut snapshot = attributes.snapshot();
        assert_eq!(&snapshot, attributes.as_map());

        snapshot.insert("scary".into(), json!(true));
        assert!(!attributes.has("scary"));
    }
}
