//! Result collections
//!
//! An ordered sequence of hydrated model instances returned from a
//! multi-row query. Constructed once from a finite list and read-only
//! afterwards; rows may hydrate into different model types.

use crate::model::Model;

/// Ordered, possibly heterogeneous sequence of hydrated models
#[derive(Debug, Clone, Default)]
pub struct Collection {
    models: Vec<Model>,
}

impl Collection {
    /// Wrap an ordered list of hydrated instances
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when the collection holds no models
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Borrow the model at `index`, in view order
    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    /// Borrow the first model
    pub fn first(&self) -> Option<&Model> {
        self.models.first()
    }

    /// Iterate over the models in view order
    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.models.iter()
    }

    /// Borrow the whole ordered slice
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Hand ownership of the models to the caller
    pub fn into_models(self) -> Vec<Model> {
        self.models
    }
}

impl From<Vec<Model>> for Collection {
    fn from(models: Vec<Model>) -> Self {
        Self::new(models)
    }
}

impl IntoIterator for Collection {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
