//! Context retrieval from VXDF files.
//!
//! Parsing and ranking live in an external search script; this crate locates
//! the script and the data file, runs the script with the first interpreter
//! that exists on the host, and turns every failure into "no context".

mod config;
mod interpreter;
mod retriever;
mod runner;

pub use config::{
    DATA_DIR, DEFAULT_DATA_FILE, MAX_ROOT_SEARCH_LEVELS, PYTHON_BIN_ENV, RagConfig, SEARCH_SCRIPT,
    discover_root, interpreter_candidates,
};
pub use interpreter::{AttemptOutcome, resolve_first};
pub use retriever::{DEFAULT_TOP_K, VxdfRetriever, split_chunks};
pub use runner::{CommandOutput, CommandRunner, StdCommandRunner};
