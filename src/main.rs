mod cli;
mod config;
mod console;
mod execution;
mod handlers;
mod logging;
mod panel;
mod printer;
mod surface;
mod tui;
mod utils;

use std::process::ExitCode;

use anyhow::Result;
use config::Config;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    // Load config; command-line flags win over file and env
    let mut cfg = Config::load();
    if let Some(url) = &args.base_url {
        cfg.set("CODERUN_BASE_URL", url.as_str());
    }
    if let Some(endpoint) = &args.endpoint {
        cfg.set("CODERUN_RUN_ENDPOINT", endpoint.as_str());
    }
    if let Some(width) = args.separator_width {
        cfg.set("CODERUN_SEPARATOR_WIDTH", width.to_string());
    }
    if args.no_color {
        cfg.set("CODERUN_COLOR", "false");
    }

    // Route to handler
    match args.command {
        Some(cli::Command::Run { source }) => {
            logging::init_stderr("warn");
            handlers::run::run(&cfg, &source, args.no_color).await
        }
        Some(cli::Command::ShowConfig) => {
            println!("# {}", cfg.config_path.display());
            for (key, value) in cfg.entries() {
                println!("{key}={value}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(cli::Command::Edit { file }) => edit(cfg, file.as_deref()).await,
        None => edit(cfg, None).await,
    }
}

async fn edit(cfg: Config, file: Option<&str>) -> Result<ExitCode> {
    let _log_guard = match logging::init_file(&cfg.log_file(), "info") {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };
    handlers::edit::run(cfg, file).await?;
    Ok(ExitCode::SUCCESS)
}
