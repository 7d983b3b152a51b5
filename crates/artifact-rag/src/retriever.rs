use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::RagConfig;
use crate::interpreter::{AttemptOutcome, resolve_first};
use crate::runner::{CommandOutput, CommandRunner, StdCommandRunner};

/// Number of passages requested when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// Separator the search script prints between passages.
const CHUNK_SEPARATOR: &str = "\n---\n";

#[derive(Debug, thiserror::Error)]
enum RetrievalFailure {
    #[error("data file not found: {}", .0.display())]
    DataFileMissing(PathBuf),
    #[error("no usable interpreter found (tried {0:?}); set PYTHON_BIN if one is available")]
    NoInterpreter(Vec<String>),
    #[error("failed to spawn {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        source: std::io::Error,
    },
    #[error("search exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("search produced no output")]
    EmptyOutput,
}

/// Fetches context passages for a query from the configured VXDF file.
pub struct VxdfRetriever {
    config: RagConfig,
    runner: Arc<dyn CommandRunner>,
}

impl VxdfRetriever {
    pub fn new(config: RagConfig) -> Self {
        Self::with_runner(config, Arc::new(StdCommandRunner))
    }

    pub fn with_runner(config: RagConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Returns the top `k` passages for `query`, or `None` when no context is
    /// available for any reason. A `k` of zero is treated as one.
    ///
    /// Blocks for as long as the search process runs.
    pub fn get_context(&self, query: &str, k: usize) -> Option<String> {
        match self.try_get_context(query, k.max(1)) {
            Ok(context) => {
                info!(
                    event = "rag.context_retrieved",
                    domain = "rag",
                    context_len = context.len() as u64
                );
                Some(context)
            }
            Err(failure @ RetrievalFailure::DataFileMissing(_)) => {
                warn!(event = "rag.skipped", domain = "rag", error = %failure, "skipping retrieval");
                None
            }
            Err(failure @ RetrievalFailure::EmptyOutput) => {
                debug!(event = "rag.empty", domain = "rag", error = %failure);
                None
            }
            Err(failure) => {
                error!(event = "rag.failed", domain = "rag", error = %failure, "retrieval failed");
                None
            }
        }
    }

    fn try_get_context(&self, query: &str, k: usize) -> Result<String, RetrievalFailure> {
        let data_file = self.config.data_file_path();
        if !data_file.exists() {
            return Err(RetrievalFailure::DataFileMissing(data_file));
        }

        let args: Vec<OsString> = vec![
            self.config.script_path().into_os_string(),
            data_file.into_os_string(),
            query.into(),
            k.to_string().into(),
        ];
        let resolved = resolve_first(&self.config.interpreters, |interpreter| {
            match self.runner.run(interpreter, &args) {
                Err(err) if err.kind() == ErrorKind::NotFound => AttemptOutcome::NotFound,
                other => AttemptOutcome::Finished(other),
            }
        });

        let (interpreter, result) = resolved
            .ok_or_else(|| RetrievalFailure::NoInterpreter(self.config.interpreters.clone()))?;
        let output: CommandOutput = result.map_err(|source| RetrievalFailure::Spawn {
            interpreter: interpreter.to_string(),
            source,
        })?;
        debug!(
            event = "rag.search_finished",
            domain = "rag",
            interpreter,
            code = ?output.code
        );
        if !output.success {
            return Err(RetrievalFailure::NonZeroExit {
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let context = output.stdout.trim();
        if context.is_empty() {
            return Err(RetrievalFailure::EmptyOutput);
        }
        Ok(context.to_string())
    }
}

/// Splits retrieved context into the individual passages.
pub fn split_chunks(context: &str) -> Vec<&str> {
    context
        .split(CHUNK_SEPARATOR)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedRunner {
        replies: Mutex<VecDeque<std::io::Result<CommandOutput>>>,
        calls: Mutex<Vec<(String, Vec<OsString>)>>,
    }

    impl ScriptedRunner {
        fn with_replies(replies: Vec<std::io::Result<CommandOutput>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::default(),
            })
        }

        fn programs(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(program, _)| program.clone())
                .collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(std::io::Error::from(ErrorKind::NotFound)))
        }
    }

    fn not_found() -> std::io::Result<CommandOutput> {
        Err(std::io::Error::from(ErrorKind::NotFound))
    }

    fn exited(success: bool, stdout: &str, stderr: &str) -> std::io::Result<CommandOutput> {
        Ok(CommandOutput {
            success,
            code: Some(if success { 0 } else { 1 }),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    fn root_with_data(dir: &Path) -> RagConfig {
        std::fs::create_dir_all(dir.join("vxdf-data")).unwrap();
        std::fs::write(dir.join("vxdf-data/CBN_Fintech_Policies.vxdf"), b"vxdf").unwrap();
        RagConfig::new(dir).interpreters(["python3", "python"])
    }

    #[test]
    fn missing_data_file_returns_none_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![exited(true, "unused", "")]);
        let retriever = VxdfRetriever::with_runner(
            RagConfig::new(dir.path()).interpreters(["python3"]),
            runner.clone(),
        );
        assert_eq!(retriever.get_context("kyc", 4), None);
        assert!(runner.programs().is_empty());
    }

    #[test]
    fn falls_back_to_next_interpreter_when_first_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![
            not_found(),
            exited(true, "  chunk1\nchunk2\n\n", ""),
        ]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());

        assert_eq!(
            retriever.get_context("kyc", 4).as_deref(),
            Some("chunk1\nchunk2")
        );
        assert_eq!(runner.programs(), vec!["python3", "python"]);
    }

    #[test]
    fn passes_script_data_file_query_and_k() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![exited(true, "chunk", "")]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());

        retriever.get_context("capital requirements", 2);

        let calls = runner.calls.lock().unwrap();
        let (_, args) = &calls[0];
        assert_eq!(
            args,
            &vec![
                OsString::from(dir.path().join("scripts/vxdf_search.py")),
                OsString::from(dir.path().join("vxdf-data/CBN_Fintech_Policies.vxdf")),
                OsString::from("capital requirements"),
                OsString::from("2"),
            ]
        );
    }

    #[test]
    fn zero_k_is_raised_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![exited(true, "chunk", "")]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());
        retriever.get_context("q", 0);
        assert_eq!(runner.calls.lock().unwrap()[0].1[3], OsString::from("1"));
    }

    #[test]
    fn whitespace_output_is_no_context() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![exited(true, " \n\t\n", "")]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner);
        assert_eq!(retriever.get_context("q", 4), None);
    }

    #[test]
    fn non_zero_exit_is_no_context_and_stops_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![
            exited(false, "partial", "Traceback: ModuleNotFoundError: vxdf"),
            exited(true, "should not run", ""),
        ]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());
        assert_eq!(retriever.get_context("q", 4), None);
        assert_eq!(runner.programs(), vec!["python3"]);
    }

    #[test]
    fn other_spawn_errors_stop_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![
            Err(std::io::Error::from(ErrorKind::PermissionDenied)),
            exited(true, "should not run", ""),
        ]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());
        assert_eq!(retriever.get_context("q", 4), None);
        assert_eq!(runner.programs(), vec!["python3"]);
    }

    #[test]
    fn no_interpreter_found_is_no_context() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::with_replies(vec![not_found(), not_found()]);
        let retriever = VxdfRetriever::with_runner(root_with_data(dir.path()), runner.clone());
        assert_eq!(retriever.get_context("q", 4), None);
        assert_eq!(runner.programs(), vec!["python3", "python"]);
    }

    #[cfg(unix)]
    #[test]
    fn runs_real_search_process() {
        let dir = tempfile::tempdir().unwrap();
        let config = root_with_data(dir.path())
            .interpreters(["artifact-rag-no-such-interpreter", "sh"]);
        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(
            config.script_path(),
            "printf 'EU:1 (score 0.90): %s\\n---\\nEU:2 (score 0.80): k=%s\\n\\n' \"$2\" \"$3\"\n",
        )
        .unwrap();
        let retriever = VxdfRetriever::new(config);

        let context = retriever.get_context("KYC tiers", 2).expect("context");
        assert_eq!(
            context,
            "EU:1 (score 0.90): KYC tiers\n---\nEU:2 (score 0.80): k=2"
        );
        assert_eq!(
            split_chunks(&context),
            vec!["EU:1 (score 0.90): KYC tiers", "EU:2 (score 0.80): k=2"]
        );
    }

    #[test]
    fn split_chunks_ignores_blank_passages() {
        assert_eq!(split_chunks("a\n---\n\n---\nb"), vec!["a", "b"]);
        assert!(split_chunks("").is_empty());
    }
}
