use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::errors::HarnessError;
use crate::model::{ModelRef, ProviderId};
use crate::provider::ProviderAdapter;
use crate::run::RunBuilder;

pub(crate) struct HarnessInner {
    providers: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
    language_models: HashMap<String, ModelRef>,
}

impl HarnessInner {
    pub(crate) fn provider(&self, id: &ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(id).cloned()
    }
}

/// Entry point for resolving model aliases and starting runs.
#[derive(Clone)]
pub struct Harness {
    pub(crate) inner: Arc<HarnessInner>,
}

impl Harness {
    /// Starts a builder for registering providers and model aliases.
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Resolves a model alias such as `artifact-model`.
    pub fn language_model(&self, alias: &str) -> Result<ModelRef, HarnessError> {
        self.inner
            .language_models
            .get(alias)
            .cloned()
            .ok_or_else(|| HarnessError::ModelNotFound {
                alias: alias.to_string(),
            })
    }

    /// Starts building a run for the given model.
    pub fn run(&self, model: ModelRef) -> RunBuilder {
        RunBuilder::new(self.inner.clone(), model)
    }
}

/// Builder used to register provider adapters and model aliases.
#[derive(Default)]
pub struct HarnessBuilder {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    language_models: Vec<(String, ModelRef)>,
}

impl HarnessBuilder {
    /// Registers a provider adapter.
    ///
    /// Register one adapter per provider id (for example one `openai` adapter).
    pub fn register_provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Maps an alias (for example `artifact-model`) to a concrete model.
    pub fn language_model(mut self, alias: impl Into<String>, model: ModelRef) -> Self {
        self.language_models.push((alias.into(), model));
        self
    }

    /// Builds the harness and rejects duplicate providers or aliases.
    pub fn build(self) -> Result<Harness, HarnessError> {
        let mut providers: HashMap<ProviderId, Arc<dyn ProviderAdapter>> = HashMap::new();
        let mut seen: HashSet<ProviderId> = HashSet::new();
        for provider in self.providers {
            let id = provider.id();
            if !seen.insert(id.clone()) {
                return Err(HarnessError::Config(format!(
                    "duplicate provider registration: {id}"
                )));
            }
            providers.insert(id, provider);
        }

        let mut language_models = HashMap::new();
        for (alias, model) in self.language_models {
            if alias.trim().is_empty() {
                return Err(HarnessError::Config(
                    "language model alias must not be empty".into(),
                ));
            }
            if language_models.insert(alias.clone(), model).is_some() {
                return Err(HarnessError::Config(format!(
                    "duplicate language model alias: {alias}"
                )));
            }
        }

        Ok(Harness {
            inner: Arc::new(HarnessInner {
                providers,
                language_models,
            }),
        })
    }
}
