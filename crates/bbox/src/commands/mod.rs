//! Command dispatch: bridges CLI args -> core Coordinator -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod diagnostics;
pub mod sensors;
pub mod snapshot;
pub mod watch;

use bbox_core::CoordinatorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: CoordinatorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Snapshot(args) => snapshot::handle(config, args, global).await,
        Command::Devices => devices::handle(config, global).await,
        Command::Sensors => sensors::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Reboot => control::reboot(config, global).await,
        Command::Wifi(args) => control::wifi(config, args, global).await,
        Command::Wps(args) => control::wps(config, args, global).await,
        Command::Parental(args) => control::parental(config, args, global).await,
        Command::Diagnostics => diagnostics::handle(config, global).await,
        Command::Check => check::handle(config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the router dispatcher".into(),
        )),
    }
}

/// Connect, run one cycle, and return its snapshot.
pub(crate) async fn fetch_snapshot(
    config: CoordinatorConfig,
) -> Result<std::sync::Arc<bbox_core::Snapshot>, CliError> {
    let snapshot = bbox_core::Coordinator::oneshot(config, |c| async move {
        c.snapshot().ok_or(bbox_core::CoreError::CoordinatorStopped)
    })
    .await?;
    Ok(snapshot)
}
