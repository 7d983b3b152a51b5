use artifact_ai_harness::HarnessError;

/// Failure of a document generation call. The partial draft is not kept.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The model client failed to start or failed mid-stream.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The output sink rejected an event.
    #[error("data stream write failed: {0}")]
    Sink(#[from] std::io::Error),
}
