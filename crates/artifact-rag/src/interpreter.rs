/// Result of trying one candidate.
#[derive(Debug, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// The candidate does not exist on this host; try the next one.
    NotFound,
    /// The candidate ran (successfully or not); stop here.
    Finished(T),
}

/// Tries `candidates` in order and returns the first one whose attempt was
/// not `NotFound`, together with its result. `None` when every candidate was
/// missing.
pub fn resolve_first<'a, T>(
    candidates: &'a [String],
    mut attempt: impl FnMut(&str) -> AttemptOutcome<T>,
) -> Option<(&'a str, T)> {
    for candidate in candidates {
        match attempt(candidate) {
            AttemptOutcome::NotFound => {
                tracing::debug!(
                    event = "rag.interpreter_missing",
                    domain = "rag",
                    candidate = candidate.as_str()
                );
            }
            AttemptOutcome::Finished(result) => return Some((candidate.as_str(), result)),
        }
    }
    None
}
