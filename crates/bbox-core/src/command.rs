// ── Command API ──
//
// All write operations flow through a unified `Command` enum, routed
// by the coordinator's command processor to the router API.

use bbox_api::WifiBand;

use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// Every write operation the router supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Restart the router. Its data is unavailable until it is back.
    Reboot,
    SetWireless {
        band: WifiBand,
        enable: bool,
    },
    SetWps {
        enable: bool,
    },
    SetParentalControl {
        enable: bool,
    },
    SetDeviceParentalControl {
        mac: String,
        enable: bool,
    },
}

impl Command {
    /// Whether the processor refreshes after this command succeeds.
    pub fn refreshes_after(&self) -> bool {
        !matches!(self, Self::Reboot)
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The router accepted the command.
    Ok,
    /// The router accepted the command and a snapshot reflecting it was
    /// published as cycle `cycle`.
    Refreshed { cycle: u64 },
}
