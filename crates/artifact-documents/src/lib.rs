//! Text artifact generation: turns a conversation into a rewrite request,
//! streams the model's answer into a caller-supplied sink and returns the
//! accumulated draft.

mod errors;
mod extract;
mod handler;
mod message;
mod prompts;
mod relay;
mod sink;

pub use errors::DocumentError;
pub use extract::{ExtractedConversation, extract_conversation};
pub use handler::{ARTIFACT_MODEL, Document, DocumentHandler, TextDocumentHandler};
pub use message::{Message, Role};
pub use prompts::{DocumentKind, REWRITE_SYSTEM_PROMPT, rewrite_user_prompt, update_document_prompt};
pub use relay::relay_text_stream;
pub use sink::{DataStreamEvent, DataStreamWriter, JsonLinesWriter};
