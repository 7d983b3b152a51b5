/// One event of a model's output stream.
///
/// Only `TextDelta` carries document text. Consumers that build a draft must
/// ignore the other kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamFragment {
    /// Incremental text output chunk.
    TextDelta { text: String },
    /// Incremental reasoning text, when the provider exposes it.
    ReasoningDelta { text: String },
    /// The provider finished producing output.
    Finish { finish_reason: Option<String> },
}

impl StreamFragment {
    /// Creates a text delta.
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    /// Returns the payload of a text delta, `None` for every other kind.
    pub fn as_text_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text } => Some(text),
            _ => None,
        }
    }
}
