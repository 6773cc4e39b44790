//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise `default_directive` applies to this
//! crate only.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coderun={default_directive}")))
}

/// One-shot mode: logs go to stderr so stdout carries only run output.
pub fn init_stderr(default_directive: &str) {
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Workspace mode owns the terminal, so logs go to a file. Keep the returned
/// guard alive for the whole session or buffered lines are lost.
pub fn init_file(path: &Path, default_directive: &str) -> Result<Option<WorkerGuard>> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Already installed; dropping the guard shuts this writer down.
        Err(_) => Ok(None),
    }
}
