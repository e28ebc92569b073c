//! Command dispatch: bridges CLI args -> hub controller -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod mode;
pub mod panel;
pub mod snapshot;

use ringlink_core::HubController;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a hub-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &HubController,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(controller, &args, global).await,
        Command::Snapshot => snapshot::handle(controller, global).await,
        Command::Panel => panel::handle(controller, global).await,
        Command::Mode(args) => mode::handle(controller, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
