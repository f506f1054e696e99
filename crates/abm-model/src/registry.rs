//! Name-keyed registry of model factories.
//!
//! Registration takes `&mut self` and happens once at startup; afterwards the
//! registry is shared read-only (typically behind an `Arc`) and needs no
//! locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::{Model, ModelError, ModelResult, ParamSchema, ParamSet, ValidatedParams};

/// Constructs model instances from validated parameters.
pub trait ModelFactory: Send + Sync {
    /// One-line human-readable summary, shown in model listings.
    fn description(&self) -> &str;

    fn schema(&self) -> ParamSchema;

    /// Build a model.  Only called with parameters that passed `schema()`.
    fn build(&self, params: &ValidatedParams) -> ModelResult<Box<dyn Model>>;
}

/// What a front end needs to present a registered model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelDescriptor {
    pub name:        String,
    pub description: String,
    pub schema:      ParamSchema,
}

#[derive(Default)]
pub struct ModelRegistry {
    factories: BTreeMap<String, Arc<dyn ModelFactory>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`.  Fails with `DuplicateModelName` if
    /// the name is taken; the existing entry is kept.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> ModelResult<()>
    where
        F: ModelFactory + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(ModelError::DuplicateModelName(name));
        }
        debug!(model = %name, "registered model");
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Descriptors of every registered model, ordered by name.
    pub fn list(&self) -> Vec<ModelDescriptor> {
        self.factories
            .iter()
            .map(|(name, f)| ModelDescriptor {
                name:        name.clone(),
                description: f.description().to_owned(),
                schema:      f.schema(),
            })
            .collect()
    }

    /// Schema of one model.
    pub fn schema(&self, name: &str) -> ModelResult<ParamSchema> {
        self.factory(name).map(|f| f.schema())
    }

    /// Validate `params` against the model's schema, then build it.
    ///
    /// No factory code runs unless validation succeeds.
    pub fn create(&self, name: &str, params: &ParamSet) -> ModelResult<Box<dyn Model>> {
        let factory = self.factory(name)?;
        let validated = factory.schema().validate(params)?;
        let model = factory.build(&validated)?;
        debug!(model = name, params = params.len(), "created model");
        Ok(model)
    }

    fn factory(&self, name: &str) -> ModelResult<&Arc<dyn ModelFactory>> {
        self.factories
            .get(name)
            .ok_or_else(|| ModelError::UnknownModel(name.to_owned()))
    }
}
