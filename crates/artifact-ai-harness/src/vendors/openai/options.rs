/// Predicted output hint. When most of the response is already known (for
/// example when editing an existing document), OpenAI can use it to speed up
/// generation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OpenAiPrediction {
    /// Static content expected to largely reappear in the output.
    Content { content: String },
}

/// Per-run OpenAI request options.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpenAiRequestOptions {
    /// Optional predicted output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<OpenAiPrediction>,
}

impl OpenAiRequestOptions {
    /// Sets a content prediction.
    pub fn predicted_content(mut self, content: impl Into<String>) -> Self {
        self.prediction = Some(OpenAiPrediction::Content {
            content: content.into(),
        });
        self
    }
}
