//! Workspace handler: editor pane plus output panel, using Ratatui.

use std::path::PathBuf;

use anyhow::Result;
use is_terminal::IsTerminal;

use crate::{config::Config, tui::run_workspace};

/// Open the interactive workspace on `file` (created on save if missing).
pub async fn run(cfg: Config, file: Option<&str>) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        eprintln!("Warning: the workspace needs an interactive terminal.");
        eprintln!("Use `coderun run <FILE>` for redirected output.");
        return Err(anyhow::anyhow!("workspace mode requires a proper terminal environment"));
    }

    run_workspace(cfg, file.map(PathBuf::from)).await
}
