use artifact_ai_harness::{HarnessError, StreamFragment};
use futures::{Stream, StreamExt as _};
use tracing::{debug, info};

use crate::errors::DocumentError;
use crate::sink::{DataStreamEvent, DataStreamWriter};

/// Drains `fragments` in arrival order, appending every text delta to the
/// draft and forwarding it to `sink` before the next fragment is pulled.
///
/// Non-text fragments are skipped. Returns the full draft once the stream
/// ends. Any error ends the call and the partial draft is dropped. There is
/// no timeout: a stream that never ends keeps this pending.
pub async fn relay_text_stream<S, W>(
    mut fragments: S,
    sink: &mut W,
) -> Result<String, DocumentError>
where
    S: Stream<Item = Result<StreamFragment, HarnessError>> + Unpin,
    W: DataStreamWriter + ?Sized,
{
    let mut draft = String::new();
    let mut seq = 0_u64;
    while let Some(fragment) = fragments.next().await {
        let StreamFragment::TextDelta { text } = fragment? else {
            continue;
        };
        draft.push_str(&text);
        debug!(
            event = "document.text_delta",
            domain = "document",
            seq,
            delta_len = text.len() as u64
        );
        sink.write_data(&DataStreamEvent::TextDelta { content: text })?;
        seq = seq.saturating_add(1);
    }
    info!(
        event = "document.stream_completed",
        domain = "document",
        deltas = seq,
        draft_len = draft.len() as u64
    );
    Ok(draft)
}
