use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Overrides the `--verbose` level with any `EnvFilter` directive string.
pub const LOG_ENV: &str = "BUSYLINE_LOG";

/// Where logs go when `--log` is not given.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("busyline").join("demo.log"))
}

/// Route tracing output to `log_path`.
///
/// The spinner owns the terminal line, so nothing is ever logged to stdout
/// or stderr. Hold the returned guard until exit or buffered lines are lost.
pub fn init(log_path: &Path, verbose: bool) -> Result<WorkerGuard> {
    let dir = log_path
        .parent()
        .context("log path has no parent directory")?;
    let file_name = log_path.file_name().context("log path has no file name")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::registry()
        .with(filter(verbose, std::env::var(LOG_ENV).ok().as_deref()))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .try_init()
        .context("tracing subscriber already installed")?;
    Ok(guard)
}

/// An override that fails to parse falls back to the `verbose` default.
fn filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            let level = if verbose { "debug" } else { "info" };
            EnvFilter::new(format!("busyline={level},busyline_demo={level}"))
        })
}
