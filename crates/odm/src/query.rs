//! Server-side view queries and hydration
//!
//! A query wraps one view invocation under the owning type's design
//! document: fixed options, one store round trip per call, no state between
//! calls. Hydration turns each returned row's type-tagged document back into
//! an instance of the registered model type — through the same construction
//! path as any caller-made instance, so defaults and initialize hooks apply.

use serde_json::{Map, Value};

use crate::attributes::TYPE_FIELD;
use crate::collection::Collection;
use crate::error::{OdmResult, ViewError};
use crate::model::Model;
use crate::registry;
use crate::store::{DocumentStore, ViewOptions, ViewResult, ViewRow};

/// One configured view invocation: design document, fixed options, and the
/// set of view names declared on the owning type
#[derive(Debug, Clone)]
pub struct ViewQuery {
    design: String,
    options: ViewOptions,
    views: Vec<String>,
}

impl ViewQuery {
    pub(crate) fn new(design: String, options: ViewOptions, views: Vec<String>) -> Self {
        Self {
            design,
            options,
            views,
        }
    }

    /// The design-document name (the owning model's type name)
    pub fn design(&self) -> &str {
        &self.design
    }

    /// The fixed query options
    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// The view names this query responds to
    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// True when `view` is declared on the owning type
    pub fn declares(&self, view: &str) -> bool {
        self.views.iter().any(|name| name == view)
    }

    async fn run(&self, store: &dyn DocumentStore, view: &str) -> OdmResult<ViewResult> {
        if !self.declares(view) {
            return Err(ViewError::UndeclaredView {
                design: self.design.clone(),
                view: view.to_string(),
            }
            .into());
        }
        tracing::debug!("invoking view {}/{}", self.design, view);
        Ok(store.view(&self.design, view, &self.options).await?)
    }
}

/// Hydrate one raw document: dispatch on its discriminator through the type
/// registry, strip the discriminator, construct through the registered
/// definition
fn hydrate(mut document: Map<String, Value>) -> OdmResult<Model> {
    let type_name = document
        .get(TYPE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let def = match registry::lookup(&type_name) {
        Some(def) => def,
        None => {
            return Err(ViewError::UnknownType {
                type_name,
                document,
            }
            .into())
        }
    };
    document.remove(TYPE_FIELD);
    def.create(document)
}

fn row_document(mut row: ViewRow) -> Result<Map<String, Value>, ViewError> {
    match row.doc.take() {
        Some(document) => Ok(document),
        None => Err(ViewError::MissingDocument { row }),
    }
}

/// Single-result query built by [`crate::ModelDef::get_model`].
///
/// Resolves to at most one model; more than one matching row is always an
/// error, never "pick first".
#[derive(Debug, Clone)]
pub struct ModelQuery {
    query: ViewQuery,
}

impl ModelQuery {
    pub(crate) fn new(query: ViewQuery) -> Self {
        Self { query }
    }

    /// The underlying view invocation
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Invoke a declared view and hydrate its result into zero or one model
    pub async fn invoke(
        &self,
        store: &dyn DocumentStore,
        view: &str,
    ) -> OdmResult<Option<Model>> {
        let results = self.query.run(store, view).await?;
        if results.rows.len() > 1 {
            return Err(ViewError::MultipleDocuments {
                options: self.query.options().clone(),
                results,
            }
            .into());
        }
        match results.rows.into_iter().next() {
            None => Ok(None),
            Some(row) => {
                let document = row_document(row)?;
                hydrate(document).map(Some)
            }
        }
    }
}

/// Multi-result query built by [`crate::ModelDef::get_collection`].
///
/// Hydration is all-or-nothing: one unregistered discriminator fails the
/// whole batch, never a partial collection.
#[derive(Debug, Clone)]
pub struct CollectionQuery {
    query: ViewQuery,
}

impl CollectionQuery {
    pub(crate) fn new(query: ViewQuery) -> Self {
        Self { query }
    }

    /// The underlying view invocation
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Invoke a declared view and hydrate every row into an ordered
    /// collection
    pub async fn invoke(&self, store: &dyn DocumentStore, view: &str) -> OdmResult<Collection> {
        let results = self.query.run(store, view).await?;
        let mut models = Vec::with_capacity(results.rows.len());
        for row in results.rows {
            let document = row_document(row)?;
            models.push(hydrate(document)?);
        }
        Ok(Collection::new(models))
    }
}
