use std::collections::HashMap;
use std::pin::Pin;

use crate::errors::ProviderError;
use crate::model::{ModelRef, ProviderId};
use crate::stream::StreamFragment;

/// Raw fragment stream produced by a provider adapter.
pub type ProviderFragmentStream =
    Pin<Box<dyn futures::Stream<Item = Result<StreamFragment, ProviderError>> + Send + 'static>>;

/// Provider-agnostic request handed to an adapter.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    /// Unique id of this run, used for log correlation.
    pub run_id: uuid::Uuid,
    pub model: ModelRef,
    pub system_prompt: Option<String>,
    pub prompt: String,
    /// Opaque per-provider metadata keyed by provider id. Each adapter reads
    /// only its own entry.
    pub vendor_options: HashMap<ProviderId, serde_json::Value>,
}

/// Contract implemented by each vendor integration.
#[async_trait::async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider id this adapter serves. One adapter per id per harness.
    fn id(&self) -> ProviderId;

    /// Starts a streaming generation.
    ///
    /// Errors returned here mean no fragment was produced. Errors yielded by
    /// the stream are mid-generation failures.
    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderFragmentStream, ProviderError>;
}
