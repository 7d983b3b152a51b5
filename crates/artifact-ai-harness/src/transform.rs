use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt as _;
use futures::stream;

use crate::provider::ProviderFragmentStream;
use crate::stream::StreamFragment;

/// How `SmoothStream` splits buffered text into emitted chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chunking {
    /// Emit one word plus its trailing whitespace at a time.
    Word,
}

/// Re-chunks text deltas on word boundaries so output reaches the
/// consumer at an even pace regardless of how the provider batches tokens.
///
/// Non-text fragments flush the buffered text first and then pass through
/// unchanged. Text left in the buffer when the source ends is emitted as a
/// final delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmoothStream {
    pub chunking: Chunking,
    /// Pause after each emitted text chunk. `Duration::ZERO` disables it.
    pub delay: Duration,
}

impl SmoothStream {
    /// Word chunking with the default 10ms pacing.
    pub fn word() -> Self {
        Self {
            chunking: Chunking::Word,
            delay: Duration::from_millis(10),
        }
    }

    /// Overrides the pause between chunks.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn apply(self, source: ProviderFragmentStream) -> ProviderFragmentStream {
        struct State {
            source: ProviderFragmentStream,
            config: SmoothStream,
            buffer: String,
            pending: VecDeque<StreamFragment>,
            done: bool,
        }

        let smoothed = stream::try_unfold(
            State {
                source,
                config: self,
                buffer: String::new(),
                pending: VecDeque::new(),
                done: false,
            },
            |mut state| async move {
                loop {
                    if let Some(fragment) = state.pending.pop_front() {
                        if matches!(fragment, StreamFragment::TextDelta { .. })
                            && !state.config.delay.is_zero()
                        {
                            tokio::time::sleep(state.config.delay).await;
                        }
                        return Ok(Some((fragment, state)));
                    }
                    if state.done {
                        return Ok(None);
                    }

                    match state.source.next().await {
                        Some(Ok(StreamFragment::TextDelta { text })) => {
                            state.buffer.push_str(&text);
                            while let Some(end) = chunk_end(&state.buffer, state.config.chunking)
                            {
                                let rest = state.buffer.split_off(end);
                                let chunk = std::mem::replace(&mut state.buffer, rest);
                                state.pending.push_back(StreamFragment::TextDelta { text: chunk });
                            }
                        }
                        Some(Ok(other)) => {
                            flush(&mut state.buffer, &mut state.pending);
                            state.pending.push_back(other);
                        }
                        Some(Err(err)) => return Err(err),
                        None => {
                            flush(&mut state.buffer, &mut state.pending);
                            state.done = true;
                        }
                    }
                }
            },
        );
        Box::pin(smoothed)
    }
}

fn flush(buffer: &mut String, pending: &mut VecDeque<StreamFragment>) {
    if !buffer.is_empty() {
        pending.push_back(StreamFragment::TextDelta {
            text: std::mem::take(buffer),
        });
    }
}

/// Byte offset just past the first complete chunk in `buffer`.
///
/// A word chunk is everything up to the first run of non-whitespace followed
/// by its whitespace run; the whitespace run must be terminated by more text
/// or by the end of the buffer.
fn chunk_end(buffer: &str, chunking: Chunking) -> Option<usize> {
    match chunking {
        Chunking::Word => {
            let mut seen_word = false;
            let mut in_trailing_ws = false;
            for (idx, ch) in buffer.char_indices() {
                if ch.is_whitespace() {
                    if seen_word {
                        in_trailing_ws = true;
                    }
                } else if in_trailing_ws {
                    return Some(idx);
                } else {
                    seen_word = true;
                }
            }
            in_trailing_ws.then_some(buffer.len())
        }
    }
}
