use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt as _;
use tracing::debug;

use crate::errors::HarnessError;
use crate::harness::HarnessInner;
use crate::model::{ModelRef, ProviderId};
use crate::provider::ProviderRequest;
use crate::stream::StreamFragment;
use crate::transform::SmoothStream;

/// Single-pass fragment stream returned by [`RunBuilder::stream`].
///
/// The stream is consumed on the caller's task; nothing is spawned.
pub type RunStream =
    Pin<Box<dyn futures::Stream<Item = Result<StreamFragment, HarnessError>> + Send + 'static>>;

/// Builder for configuring and starting a single model run.
pub struct RunBuilder {
    harness: Arc<HarnessInner>,
    model: ModelRef,
    system_prompt: Option<String>,
    prompt: Option<String>,
    transform: Option<SmoothStream>,
    vendor_options: HashMap<ProviderId, serde_json::Value>,
}

impl RunBuilder {
    pub(crate) fn new(harness: Arc<HarnessInner>, model: ModelRef) -> Self {
        Self {
            harness,
            model,
            system_prompt: None,
            prompt: None,
            transform: None,
            vendor_options: HashMap::new(),
        }
    }

    /// Sets the system prompt for the run.
    pub fn system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = Some(text.into());
        self
    }

    /// Sets the user prompt for the run.
    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = Some(text.into());
        self
    }

    /// Applies a smoothing transform to the provider's output.
    pub fn transform(mut self, transform: SmoothStream) -> Self {
        self.transform = Some(transform);
        self
    }

    pub(crate) fn set_vendor_options_json(
        mut self,
        provider: ProviderId,
        value: serde_json::Value,
    ) -> Self {
        self.vendor_options.insert(provider, value);
        self
    }

    #[cfg(test)]
    pub(crate) fn vendor_options_value(&self, provider: &ProviderId) -> Option<&serde_json::Value> {
        self.vendor_options.get(provider)
    }

    /// Validates the builder state and starts the provider stream.
    ///
    /// Failures to start are returned here; failures after the first fragment
    /// arrive as `Err` items of the stream.
    pub async fn stream(self) -> Result<RunStream, HarnessError> {
        let harness = self.harness.clone();
        let (request, transform) = self.validate_and_build_request()?;
        let provider = harness.provider(&request.model.provider).ok_or_else(|| {
            HarnessError::ProviderNotFound {
                provider: request.model.provider.clone(),
            }
        })?;

        debug!(
            event = "ai.run_started",
            domain = "ai",
            run_id = %request.run_id,
            provider = %request.model.provider,
            model = %request.model.model,
            prompt_len = request.prompt.len() as u64,
            smoothed = transform.is_some()
        );

        let mut source = provider.start_stream(request).await?;
        if let Some(transform) = transform {
            source = transform.apply(source);
        }
        Ok(Box::pin(source.map(|item| item.map_err(HarnessError::from))))
    }

    fn validate_and_build_request(
        self,
    ) -> Result<(ProviderRequest, Option<SmoothStream>), HarnessError> {
        if self.model.provider.as_str().trim().is_empty() {
            return Err(HarnessError::Validation(
                "model provider must not be empty".into(),
            ));
        }
        if self.model.model.trim().is_empty() {
            return Err(HarnessError::Validation("model must not be empty".into()));
        }
        let prompt = self
            .prompt
            .ok_or_else(|| HarnessError::Validation("a prompt is required".into()))?;

        let request = ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: self.model,
            system_prompt: self.system_prompt.filter(|s| !s.trim().is_empty()),
            prompt,
            vendor_options: self.vendor_options,
        };
        Ok((request, self.transform))
    }
}
