//! Command dispatch: bridges CLI args -> `Syncer` -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod plan;
pub mod util;

use aqsync_core::{ArdoqClient, Syncer};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a remote-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    syncer: &Syncer<ArdoqClient>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Plan(args) => plan::handle(syncer, args, global).await,
        Command::Apply(args) => apply::handle(syncer, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal {
            message: "command does not use the remote service".into(),
        }),
    }
}
