//! Command handlers, one module per top-level subcommand.

pub mod export;
pub mod parse;
pub mod provision;
pub mod transaction;
pub mod verify;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a command to its handler. `completions` is handled in `main`.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Provision(args) => provision::handle(args, global).await,
        Command::Export(args) => export::handle(args, global).await,
        Command::Parse(args) => parse::handle(&args, global),
        Command::Verify(args) => verify::handle(&args, global),
        Command::Transaction(args) => transaction::handle(args, global).await,
        Command::Completions(_) => Ok(()),
    }
}
