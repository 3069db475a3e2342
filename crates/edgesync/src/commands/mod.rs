//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod mappings;
pub mod objects;
pub mod sources;
pub mod sync;

use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Sync(args) => sync::handle(args, global).await,
        Command::Objects(args) => objects::handle(args, global).await,
        Command::Mappings(args) => mappings::handle(args, global).await,
        Command::Sources(args) => sources::handle(args, global).await,

        // Config commands work without a complete config
        Command::Config(args) => config_cmd::handle(args, global),

        Command::Completions(args) => {
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "edgesync", &mut std::io::stdout());
            Ok(())
        }
    }
}
