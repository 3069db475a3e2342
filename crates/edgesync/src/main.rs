mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, GlobalOpts, LogFormat};
use crate::error::CliError;

// Every run is a strict sequence of awaits.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so `-o json` output on stdout stays parseable.
/// `RUST_LOG` overrides the verbosity flags.
fn init_tracing(global: &GlobalOpts) {
    let filter = if global.quiet {
        "error".to_owned()
    } else {
        let level = match global.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!(
            "warn,edgesync={level},edgesync_core={level},edgesync_api={level},edgesync_config={level}"
        )
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match global.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &cli.global).await
}
