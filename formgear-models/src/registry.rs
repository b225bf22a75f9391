//! The model registry: an explicit, passed-around catalog of built model
//! types, keyed by registration name.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::model::ModelType;

/// Name → model type catalog. Not a global: callers own one and thread it
/// through; type loading must be externally serialized if concurrent.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelType>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: IndexMap::new(),
        }
    }

    /// Register a model type under its registration name. Last write wins
    /// for duplicate names.
    pub fn register(&mut self, model: ModelType) {
        let name = model.name().to_string();
        debug!(model = %name, "registering model type");
        self.models.insert(name, model);
    }

    /// Look up a registered model type by name.
    pub fn get(&self, name: &str) -> Result<ModelType> {
        self.models
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::ModelNotRegistered { name: name.into() })
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Registered model types, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelType> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
