use std::path::{Path, PathBuf};

/// Search script, relative to the root. Its presence marks the root.
pub const SEARCH_SCRIPT: &str = "scripts/vxdf_search.py";
/// Directory holding the VXDF data files, relative to the root.
pub const DATA_DIR: &str = "vxdf-data";
/// The only queryable data file.
pub const DEFAULT_DATA_FILE: &str = "CBN_Fintech_Policies.vxdf";
/// How many directories `discover_root` inspects, starting with the start directory.
pub const MAX_ROOT_SEARCH_LEVELS: usize = 6;
/// Environment variable naming the preferred interpreter.
pub const PYTHON_BIN_ENV: &str = "PYTHON_BIN";

/// Where retrieval finds its script and data, and how it runs the script.
///
/// Build it once at startup and hand it to [`crate::VxdfRetriever`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RagConfig {
    pub root_dir: PathBuf,
    pub data_file_name: String,
    /// Interpreters to try, in order.
    pub interpreters: Vec<String>,
}

impl RagConfig {
    /// Config rooted at `root_dir` with the default data file and interpreters
    /// taken from `PYTHON_BIN`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let override_bin = std::env::var(PYTHON_BIN_ENV).ok();
        Self {
            root_dir: root_dir.into(),
            data_file_name: DEFAULT_DATA_FILE.to_string(),
            interpreters: interpreter_candidates(override_bin.as_deref()),
        }
    }

    /// Discovers the root from the running executable's directory, falling
    /// back to the current working directory.
    pub fn discover() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::discover_from(exe_dir.as_deref(), cwd)
    }

    /// Roots the config at the first ancestor of `start` holding
    /// [`SEARCH_SCRIPT`], or at `cwd` when there is none.
    pub fn discover_from(start: Option<&Path>, cwd: PathBuf) -> Self {
        let root = start.and_then(discover_root).unwrap_or(cwd);
        tracing::debug!(
            event = "rag.root_resolved",
            domain = "rag",
            root = %root.display()
        );
        Self::new(root)
    }

    pub fn data_file_name(mut self, name: impl Into<String>) -> Self {
        self.data_file_name = name.into();
        self
    }

    pub fn interpreters<I, S>(mut self, interpreters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interpreters = interpreters.into_iter().map(Into::into).collect();
        self
    }

    pub fn script_path(&self) -> PathBuf {
        self.root_dir.join(SEARCH_SCRIPT)
    }

    pub fn data_file_path(&self) -> PathBuf {
        self.root_dir.join(DATA_DIR).join(&self.data_file_name)
    }
}

/// Walks from `start` towards the filesystem root looking for a directory
/// that contains [`SEARCH_SCRIPT`]. Gives up after [`MAX_ROOT_SEARCH_LEVELS`]
/// directories.
pub fn discover_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    for _ in 0..MAX_ROOT_SEARCH_LEVELS {
        let dir = current?;
        if dir.join(SEARCH_SCRIPT).exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

/// Ordered interpreter names: a non-blank override first, then `python3`, then `python`.
pub fn interpreter_candidates(override_bin: Option<&str>) -> Vec<String> {
    override_bin
        .map(str::trim)
        .filter(|bin| !bin.is_empty())
        .into_iter()
        .chain(["python3", "python"])
        .map(str::to_owned)
        .collect()
}
