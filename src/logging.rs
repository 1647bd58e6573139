use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// An explicit `--log-level` wins over `RUST_LOG`; `info` when neither is usable.
fn env_filter(level: Option<&str>) -> EnvFilter {
    level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Logs to stderr. Used by the one-shot subcommands.
pub fn init_stderr(level: Option<&str>) {
    fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs for the TUI: appended to `file` when given, otherwise dropped so
/// the alternate screen stays clean.
pub fn init_tui(level: Option<&str>, file: Option<&Path>) -> Result<()> {
    match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            fmt()
                .with_env_filter(env_filter(level))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            fmt().with_env_filter(env_filter(level)).with_writer(std::io::sink).init();
        }
    }
    Ok(())
}
