use artifact_ai_harness::vendors::openai::{OpenAiRequestOptions, OpenAiRunBuilderExt as _};
use artifact_ai_harness::{Harness, SmoothStream};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::DocumentError;
use crate::extract::extract_conversation;
use crate::message::Message;
use crate::prompts::{DocumentKind, REWRITE_SYSTEM_PROMPT, rewrite_user_prompt, update_document_prompt};
use crate::relay::relay_text_stream;
use crate::sink::DataStreamWriter;

/// Model alias every artifact handler generates with.
pub const ARTIFACT_MODEL: &str = "artifact-model";

/// A stored document being edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub kind: DocumentKind,
    #[serde(default)]
    pub content: Option<String>,
}

/// Generation callbacks for one artifact kind.
#[async_trait::async_trait]
pub trait DocumentHandler: Send + Sync {
    fn kind(&self) -> DocumentKind;

    /// Generates a new document from the conversation and returns its content.
    async fn on_create_document(
        &self,
        title: &str,
        messages: &[Message],
        sink: &mut dyn DataStreamWriter,
    ) -> Result<String, DocumentError>;

    /// Rewrites `document` according to `description` and returns the new content.
    async fn on_update_document(
        &self,
        document: &Document,
        description: &str,
        sink: &mut dyn DataStreamWriter,
    ) -> Result<String, DocumentError>;
}

/// Handler for Markdown text artifacts.
pub struct TextDocumentHandler {
    harness: Harness,
    smoothing: SmoothStream,
}

impl TextDocumentHandler {
    /// `harness` must map [`ARTIFACT_MODEL`] to a model.
    pub fn new(harness: Harness) -> Self {
        Self {
            harness,
            smoothing: SmoothStream::word(),
        }
    }

    /// Overrides the word-smoothing transform (for example to drop the pacing delay).
    pub fn with_smoothing(mut self, smoothing: SmoothStream) -> Self {
        self.smoothing = smoothing;
        self
    }
}

#[async_trait::async_trait]
impl DocumentHandler for TextDocumentHandler {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Text
    }

    async fn on_create_document(
        &self,
        title: &str,
        messages: &[Message],
        sink: &mut dyn DataStreamWriter,
    ) -> Result<String, DocumentError> {
        let extracted = extract_conversation(messages);
        info!(
            event = "document.create_started",
            domain = "document",
            kind = "text",
            title,
            messages = messages.len() as u64,
            policy_len = extracted.policy_text.len() as u64,
            suggestions_len = extracted.suggestions_text.len() as u64
        );

        let model = self.harness.language_model(ARTIFACT_MODEL)?;
        let fragments = self
            .harness
            .run(model)
            .system_prompt(REWRITE_SYSTEM_PROMPT)
            .prompt(rewrite_user_prompt(
                &extracted.policy_text,
                &extracted.suggestions_text,
            ))
            .transform(self.smoothing.clone())
            .stream()
            .await?;
        relay_text_stream(fragments, sink).await
    }

    async fn on_update_document(
        &self,
        document: &Document,
        description: &str,
        sink: &mut dyn DataStreamWriter,
    ) -> Result<String, DocumentError> {
        let content = document.content.as_deref().unwrap_or("");
        info!(
            event = "document.update_started",
            domain = "document",
            kind = "text",
            title = document.title.as_str(),
            content_len = content.len() as u64,
            description_len = description.len() as u64
        );

        let model = self.harness.language_model(ARTIFACT_MODEL)?;
        let fragments = self
            .harness
            .run(model)
            .system_prompt(update_document_prompt(content, DocumentKind::Text))
            .prompt(description)
            .transform(self.smoothing.clone())
            .openai_options(OpenAiRequestOptions::default().predicted_content(content))
            .stream()
            .await?;
        relay_text_stream(fragments, sink).await
    }
}
