use std::io::Write;

use serde::{Deserialize, Serialize};

/// Event written to the client's data stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DataStreamEvent {
    /// `{"type":"text-delta","content":"..."}`
    TextDelta { content: String },
}

impl DataStreamEvent {
    pub fn text_delta(content: impl Into<String>) -> Self {
        Self::TextDelta {
            content: content.into(),
        }
    }
}

/// Destination for relayed events. Writes are synchronous; the relay does not
/// pull the next fragment until `write_data` returns.
pub trait DataStreamWriter: Send {
    fn write_data(&mut self, event: &DataStreamEvent) -> std::io::Result<()>;
}

impl DataStreamWriter for Vec<DataStreamEvent> {
    fn write_data(&mut self, event: &DataStreamEvent) -> std::io::Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// Writes each event as one JSON object per line and flushes after each one.
pub struct JsonLinesWriter<W> {
    inner: W,
}

impl<W: Write + Send> JsonLinesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> DataStreamWriter for JsonLinesWriter<W> {
    fn write_data(&mut self, event: &DataStreamEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.inner, event)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }
}
