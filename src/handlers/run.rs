//! One-shot handler: run a file (or stdin) once and print the outcome.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use is_terminal::IsTerminal;

use crate::{
    config::Config,
    console::RunConsole,
    execution::{ExecutionClient, ExecutionResult},
    printer::TerminalPrinter,
    surface::{shared, FileEditor},
};

/// Exit status for scripts: 0 when the code ran cleanly, 1 when the run
/// failed in any way, 2 when nothing was run.
fn exit_status(settled: Option<&ExecutionResult>) -> u8 {
    match settled {
        Some(result) if result.is_success() => 0,
        Some(_) => 1,
        None => 2,
    }
}

pub async fn run(cfg: &Config, source: &str, no_color: bool) -> Result<ExitCode> {
    let editor = FileEditor::open(source)?;
    let color = !no_color && cfg.get_bool("CODERUN_COLOR") && std::io::stdout().is_terminal();

    let client = ExecutionClient::from_config(cfg)?;
    tracing::debug!(url = client.url(), source, "one-shot run");

    let console = RunConsole::new(
        Arc::new(editor),
        shared(TerminalPrinter::stdout(color)),
        Arc::new(client),
    )
    .with_separator_width(cfg.separator_width());

    let settled = console.run().await;
    Ok(ExitCode::from(exit_status(settled.as_ref())))
}
