//! Model type definitions
//!
//! A [`Definition`] collects the options a model type is declared with;
//! [`crate::define`] turns it into a registered [`ModelDef`], the factory
//! every instance of that type is constructed through — both by callers and
//! by view hydration.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use ottoman_validation::Schema;

use crate::error::OdmResult;
use crate::model::Model;
use crate::query::{CollectionQuery, ModelQuery, ViewQuery};
use crate::store::ViewOptions;

/// Hook invoked once per constructed instance, after attributes are populated
pub type InitializeHook = Arc<dyn Fn(&mut Model) + Send + Sync>;

/// Options for a model type definition
#[derive(Clone, Default)]
pub struct Definition {
    defaults: Map<String, Value>,
    schema: Option<Schema>,
    views: Vec<String>,
    initialize: Option<InitializeHook>,
}

impl Definition {
    /// Start an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-level default attributes, merged under explicit constructor
    /// attributes (explicit values always win)
    pub fn defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add a single default attribute
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Validation schema; absence disables validation entirely
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Declare a named server-side view this type exposes for querying
    pub fn view(mut self, name: impl Into<String>) -> Self {
        self.views.push(name.into());
        self
    }

    /// Hook run on every constructed instance after attributes are populated
    pub fn initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Model) + Send + Sync + 'static,
    {
        self.initialize = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("defaults", &self.defaults)
            .field("schema", &self.schema.is_some())
            .field("views", &self.views)
            .field("initialize", &self.initialize.is_some())
            .finish()
    }
}

/// A registered model type: named factory for instances plus the type's
/// persistence and query configuration
pub struct ModelDef {
    name: String,
    defaults: Map<String, Value>,
    schema: Option<Schema>,
    views: Vec<String>,
    initialize: Option<InitializeHook>,
}

impl fmt::Debug for ModelDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDef")
            .field("name", &self.name)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

impl ModelDef {
    pub(crate) fn new(name: String, definition: Definition) -> Self {
        Self {
            name,
            defaults: definition.defaults,
            schema: definition.schema,
            views: definition.views,
            initialize: definition.initialize,
        }
    }

    /// The registered type name, used as discriminator value and as the
    /// design-document namespace for views
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The view names declared on this type
    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// The validation schema, when one was declared
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Construct an instance from initial attributes
    pub fn create(self: &Arc<Self>, attributes: Map<String, Value>) -> OdmResult<Model> {
        self.build(None, attributes)
    }

    /// Construct an instance with an explicit id; the id overwrites any
    /// `_id` in the attributes
    pub fn create_with_id(
        self: &Arc<Self>,
        id: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> OdmResult<Model> {
        self.build(Some(id.into()), attributes)
    }

    /// Shared construction path: overlay defaults under explicit attributes,
    /// apply the id, enforce the reserved discriminator, run the hook
    pub(crate) fn build(
        self: &Arc<Self>,
        id: Option<String>,
        attributes: Map<String, Value>,
    ) -> OdmResult<Model> {
        let mut merged = self.defaults.clone();
        for (key, value) in attributes {
            merged.insert(key, value);
        }
        if let Some(id) = id {
            merged.insert("_id".to_string(), Value::String(id));
        }

        let mut model = Model::bare(Arc::clone(self));
        model.attributes_mut().merge(merged)?;

        if let Some(hook) = &self.initialize {
            (hook)(&mut model);
        }
        Ok(model)
    }

    /// Build a single-result query against this type's views.
    ///
    /// The row limit is 2, not 1: one round trip is enough to tell
    /// "exactly one" from "more than one", and ambiguity is an error.
    pub fn get_model(self: &Arc<Self>, key: impl Into<Value>) -> ModelQuery {
        let options = ViewOptions {
            key: Some(key.into()),
            include_docs: true,
            limit: Some(2),
        };
        ModelQuery::new(ViewQuery::new(
            self.name.clone(),
            options,
            self.views.clone(),
        ))
    }

    /// Build a multi-result query against this type's views: a full scan of
    /// the invoked view, with documents included
    pub fn get_collection(self: &Arc<Self>) -> CollectionQuery {
        let options = ViewOptions {
            include_docs: true,
            ..ViewOptions::default()
        };
        CollectionQuery::new(ViewQuery::new(
            self.name.clone(),
            options,
            self.views.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdmError;
    use crate::registry::define;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[test]
    fn create_with_id_sets_the_id() {
        let def = define("DefMonster", Definition::new()).unwrap();
        let marvin = def.create_with_id("marvin", Map::new()).unwrap();
        assert_eq!(marvin.id(), Some("marvin"));
    }

    #[test]
    fn explicit_id_overwrites_attribute_id() {
        let def = define("DefMonsterId", Definition::new()).unwrap();
        let marvin = def
            .create_with_id("marvin", object(json!({"_id": "other"})))
            .unwrap();
        assert_eq!(marvin.id(), Some("marvin"));
    }

    #[test]
    fn defaults_fill_in_missing_attributes_only() {
        let def = define(
            "DefMonsterDefaults",
            Definition::new()
                .default_value("location", "couch")
                .default_value("scary", false),
        )
        .unwrap();

        let marvin = def
            .create(object(json!({"scary": true, "teeth": "sharp"})))
            .unwrap();
        assert_eq!(
            marvin.to_json(),
            object(json!({"location": "couch", "scary": true, "teeth": "sharp"}))
        );
    }

    #[test]
    fn construction_rejects_a_supplied_discriminator() {
        let def = define("DefMonsterReserved", Definition::new()).unwrap();
        let error = def
            .create(object(json!({"type": "Not Monster"})))
            .unwrap_err();
        assert!(matches!(error, OdmError::ReservedAttribute { .. }));
    }

    #[test]
    fn initialize_hook_runs_after_population() {
        let def = define(
            "DefMonsterInit",
            Definition::new().initialize(|model| {
                let location = model.get("location").cloned().unwrap_or(Value::Null);
                model.set("initialized_with", location).unwrap();
            }),
        )
        .unwrap();

        let marvin = def.create(object(json!({"location": "couch"}))).unwrap();
        assert_eq!(marvin.get("initialized_with"), Some(&json!("couch")));
    }

    #[test]
    fn get_model_fixes_key_docs_and_limit() {
        let def = define(
            "DefMonsterSingle",
            Definition::new().view("by_location"),
        )
        .unwrap();

        let query = def.get_model("couch");
        assert_eq!(query.query().design(), "DefMonsterSingle");
        assert_eq!(query.query().options().key, Some(json!("couch")));
        assert!(query.query().options().include_docs);
        assert_eq!(query.query().options().limit, Some(2));
        assert!(query.query().declares("by_location"));
    }

    #[test]
    fn get_collection_scans_the_whole_view() {
        let def = define(
            "DefMonsterMany",
            Definition::new().view("by_location"),
        )
        .unwrap();

        let query = def.get_collection();
        assert_eq!(query.query().options().key, None);
        assert!(query.query().options().include_docs);
        assert_eq!(query.query().options().limit, None);
    }
}
