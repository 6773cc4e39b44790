use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "coderun", about = "Edit code in the terminal and run it on a remote run_code service", version)]
pub struct Cli {
    /// Base URL of the execution service (overrides CODERUN_BASE_URL).
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Path of the run endpoint, or a full URL (overrides CODERUN_RUN_ENDPOINT).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Width of the separator drawn around each run.
    #[arg(long = "separator-width", global = true)]
    pub separator_width: Option<usize>,

    /// Disable coloured banners in one-shot output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a file once and print the result. Use `-` to read the code from stdin.
    Run {
        #[arg(value_name = "FILE")]
        source: String,
    },
    /// Open the interactive workspace (editor and output panel).
    Edit {
        #[arg(value_name = "FILE")]
        file: Option<String>,
    },
    /// Print the effective configuration.
    ShowConfig,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_takes_a_source_and_global_flags() {
        let cli = Cli::try_parse_from(["coderun", "run", "main.py", "--base-url", "http://sandbox:8000"])
            .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://sandbox:8000"));
        match cli.command {
            Some(Command::Run { source }) => assert_eq!(source, "main.py"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["coderun"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn edit_file_is_optional() {
        let cli = Cli::try_parse_from(["coderun", "edit"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Edit { file: None })));
    }
}
