//! Streaming language-model client for artifact generation.
//!
//! Providers are registered once on a [`Harness`] together with the model
//! aliases the document handlers ask for (for example `artifact-model`).
//! Vendor-specific APIs are namespaced under `vendors::*`.
//!
//! # Usage (OpenAI)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use artifact_ai_harness::prelude::*;
//! use artifact_ai_harness::vendors::openai::OpenAiProvider;
//! use futures::StreamExt as _;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), HarnessError> {
//! let harness = Harness::builder()
//!     .register_provider(Arc::new(OpenAiProvider::from_env()?))
//!     .language_model("artifact-model", ModelRef::new("openai", "gpt-4o-mini"))
//!     .build()?;
//!
//! let mut fragments = harness
//!     .run(harness.language_model("artifact-model")?)
//!     .system_prompt("Answer briefly.")
//!     .prompt("Say hello")
//!     .transform(SmoothStream::word())
//!     .stream()
//!     .await?;
//!
//! while let Some(fragment) = fragments.next().await {
//!     if let StreamFragment::TextDelta { text } = fragment? {
//!         print!("{text}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Public error types used by the harness API.
pub mod errors;
/// Harness entry point, provider registry and model aliases.
pub mod harness;
/// Model and provider identifiers.
pub mod model;
/// Common imports for typical usage.
pub mod prelude;
/// Provider adapter contracts used by vendor integrations.
pub mod provider;
/// Run builder and the fragment stream it produces.
pub mod run;
/// Stream fragment types.
pub mod stream;
/// Stream transforms applied between the provider and the consumer.
pub mod transform;
/// Vendor-specific integrations and extension traits.
pub mod vendors;

pub use errors::{HarnessError, ProviderError};
pub use harness::{Harness, HarnessBuilder};
pub use model::{ModelRef, ProviderId};
pub use provider::{ProviderAdapter, ProviderFragmentStream, ProviderRequest};
pub use run::{RunBuilder, RunStream};
pub use stream::StreamFragment;
pub use transform::{Chunking, SmoothStream};
