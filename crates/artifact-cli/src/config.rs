use std::path::PathBuf;
use std::sync::Arc;

use artifact_ai_harness::vendors::openai::{OPENAI_PROVIDER, OpenAiProvider};
use artifact_ai_harness::{Harness, HarnessError, ModelRef};
use artifact_documents::ARTIFACT_MODEL;

/// Environment variable naming the model behind the artifact alias.
pub const ARTIFACT_MODEL_ENV: &str = "ARTIFACT_MODEL";
pub const DEFAULT_ARTIFACT_MODEL: &str = "gpt-4o-mini";

/// What happened when looking for a `.env` file.
#[derive(Debug, PartialEq, Eq)]
pub enum DotenvStatus {
    Loaded(PathBuf),
    Missing,
    Invalid(String),
}

impl From<dotenvy::Result<PathBuf>> for DotenvStatus {
    fn from(result: dotenvy::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(err) if err.not_found() => Self::Missing,
            Err(err) => Self::Invalid(err.to_string()),
        }
    }
}

impl DotenvStatus {
    /// Reports the outcome; call once logging is initialized.
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => tracing::debug!(
                event = "config.dotenv_loaded",
                domain = "config",
                path = %path.display()
            ),
            Self::Missing => {}
            Self::Invalid(error) => tracing::warn!(
                event = "config.dotenv_invalid",
                domain = "config",
                error = error.as_str(),
                "ignoring unreadable .env"
            ),
        }
    }
}

/// Loads `.env` from the working directory or its ancestors, if present.
/// Runs before logging is set up so `.env` can configure it.
pub fn load_dotenv() -> DotenvStatus {
    dotenvy::dotenv().into()
}

pub fn artifact_model_name(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_ARTIFACT_MODEL)
        .to_string()
}

/// Builds a harness with the OpenAI provider and the artifact alias mapped to `ARTIFACT_MODEL`.
pub fn build_harness() -> Result<Harness, HarnessError> {
    let model = artifact_model_name(std::env::var(ARTIFACT_MODEL_ENV).ok().as_deref());
    tracing::info!(
        event = "config.harness_ready",
        domain = "config",
        alias = ARTIFACT_MODEL,
        model = model.as_str()
    );
    Harness::builder()
        .register_provider(Arc::new(OpenAiProvider::from_env()?))
        .language_model(ARTIFACT_MODEL, ModelRef::new(OPENAI_PROVIDER, model))
        .build()
}
