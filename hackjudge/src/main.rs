//! `hackjudge` command-line entry point.

use clap::Parser;

use hackjudge::cli::args::{Cli, OutputFormat};
use hackjudge::cli::commands;
use hackjudge::error::ExitCode;
use hackjudge::observability::{LogFormat, describe_metrics, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let format = match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }
    describe_metrics();

    let result = tokio::select! {
        result = commands::dispatch(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted");
            std::process::exit(ExitCode::INTERRUPTED);
        }
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
