//! Command dispatch: bridges CLI args -> core device operations -> output formatting.

pub mod config_cmd;
pub mod raw;
pub mod status;
pub mod switch;
pub mod watch;

use electrochlor_core::DeviceConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: DeviceConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(config, global).await,
        Command::Switch(args) => switch::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Raw => raw::handle(&config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
