use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const ENABLED_ENV: &str = "ARTIFACTS_OBSERVABILITY_ENABLED";
const LOG_LEVEL_ENV: &str = "ARTIFACTS_LOG_LEVEL";
const JSON_LOG_PATH_ENV: &str = "ARTIFACTS_JSON_LOG_PATH";
const DEFAULT_LOG_FILE: &str = "policy-artifacts.logs.jsonl";

fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn observability_enabled(raw: Option<&str>) -> bool {
    raw.map(|value| parse_bool_env(value).unwrap_or(true))
        .unwrap_or(true)
}

fn resolve_env_filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `ARTIFACTS_OBSERVABILITY_ENABLED`: optional enable/disable flag (default enabled).
/// - `ARTIFACTS_LOG_LEVEL`: optional level/filter override (`info`, `debug`, etc.).
/// - `ARTIFACTS_JSON_LOG_PATH`: optional log file path. If set, logs are JSONL in that file.
///   If unset, logs go to stderr in a compact console format; stdout carries the data stream.
/// - `RUST_LOG`: optional filter override.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !observability_enabled(std::env::var(ENABLED_ENV).ok().as_deref()) {
            return;
        }

        let env_filter = resolve_env_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref());
        if let Ok(path_raw) = std::env::var(JSON_LOG_PATH_ENV) {
            let path = std::path::PathBuf::from(path_raw);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                let _ = std::fs::create_dir_all(parent);
            }
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE);
            let writer = tracing_appender::rolling::never(dir, file_name);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    });
}
