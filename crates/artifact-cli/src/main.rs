//! `policy-artifacts`: generate and update policy text artifacts, or look up
//! policy context, from the command line.
//!
//! Generated text is written to stdout as JSON lines
//! (`{"type":"text-delta","content":"..."}`); logs go to stderr or to the file
//! named by `ARTIFACTS_JSON_LOG_PATH`.

mod config;
mod observability;

use std::path::{Path, PathBuf};

use artifact_documents::{Document, DocumentHandler as _, JsonLinesWriter, Message, TextDocumentHandler};
use artifact_rag::{DEFAULT_TOP_K, RagConfig, VxdfRetriever};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

#[derive(Debug, Parser)]
#[command(name = "policy-artifacts", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rewrite the policy found in a conversation into a new document.
    Create {
        /// JSON file holding the conversation as an array of `{role, content}` messages.
        #[arg(long)]
        messages: PathBuf,
        #[arg(long)]
        title: String,
    },
    /// Update an existing document according to a change description.
    Update {
        /// JSON file holding `{title, kind, content}`.
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        description: String,
    },
    /// Print policy context passages for a query.
    Context {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        /// Directory holding `scripts/` and `vxdf-data/`; discovered when omitted.
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = config::load_dotenv();
    observability::init_observability();
    dotenv.log();
    let cli = Cli::parse();

    match cli.command {
        Command::Create { messages, title } => {
            let messages: Vec<Message> = read_json(&messages)?;
            let handler = TextDocumentHandler::new(config::build_harness()?);
            let mut sink = JsonLinesWriter::new(std::io::stdout());
            handler
                .on_create_document(&title, &messages, &mut sink)
                .await?;
        }
        Command::Update {
            document,
            description,
        } => {
            let document: Document = read_json(&document)?;
            let handler = TextDocumentHandler::new(config::build_harness()?);
            let mut sink = JsonLinesWriter::new(std::io::stdout());
            handler
                .on_update_document(&document, &description, &mut sink)
                .await?;
        }
        Command::Context { query, k, root } => {
            let rag = root.map(RagConfig::new).unwrap_or_else(RagConfig::discover);
            let retriever = VxdfRetriever::new(rag);
            match retriever.get_context(&query, k) {
                Some(context) => println!("{context}"),
                None => tracing::warn!(
                    event = "cli.no_context",
                    domain = "cli",
                    query = query.as_str(),
                    "no context available"
                ),
            }
        }
    }

    Ok(())
}
