//! Clap derive structures for the `bbox` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use bbox_core::WifiBand;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bbox -- poll and control a Bbox router from the command line
#[derive(Debug, Parser)]
#[command(
    name = "bbox",
    version,
    about = "Poll and control a Bbox router from the command line",
    long_about = "Reads the router management API into one consistent snapshot\n\
        (box info, connected devices, WAN counters, Wi-Fi, WPS, parental\n\
        control) and drives its toggles and reboot.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "BBOX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router host, optionally with a port (overrides profile)
    #[arg(long, env = "BBOX_HOST", global = true)]
    pub host: Option<String>,

    /// Router admin password
    #[arg(long, env = "BBOX_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Talk plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    pub no_tls: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BBOX_INSECURE", global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BBOX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BBOX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// `on` / `off` argument of the toggle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Band {
    /// 2.4 GHz radio
    #[value(name = "24")]
    Band24,
    /// 5 GHz radio
    #[value(name = "5")]
    Band5,
    /// Guest network
    Guest,
}

impl From<Band> for WifiBand {
    fn from(band: Band) -> Self {
        match band {
            Band::Band24 => Self::Band24,
            Band::Band5 => Self::Band5,
            Band::Guest => Self::Guest,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one refresh cycle and print the snapshot
    #[command(alias = "snap")]
    Snapshot(SnapshotArgs),

    /// List hosts known to the router
    #[command(alias = "dev", alias = "d")]
    Devices,

    /// Print sensor, binary sensor, and switch states
    Sensors,

    /// Keep refreshing and print every cycle outcome
    Watch(WatchArgs),

    /// Reboot the router
    Reboot,

    /// Turn a Wi-Fi radio on or off
    Wifi(WifiArgs),

    /// Turn WPS on or off
    Wps(ToggleArgs),

    /// Turn parental control on or off, globally or for one host
    Parental(ParentalArgs),

    /// Dump a redacted diagnostics report
    Diagnostics,

    /// Check that the configured credentials are accepted
    Check,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Print only the value at this dotted path (e.g. info.device.modelname)
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between cycles (overrides profile refresh_rate)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many cycle outcomes
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    pub state: Toggle,
}

#[derive(Debug, Args)]
pub struct WifiArgs {
    pub band: Band,
    pub state: Toggle,
}

#[derive(Debug, Args)]
pub struct ParentalArgs {
    pub state: Toggle,

    /// Apply to one host (MAC address) instead of the whole router
    #[arg(long)]
    pub mac: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the loaded configuration with secrets masked
    Show,

    /// Store the profile's password in the system keyring (read from stdin)
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_wifi_band_names() {
        let cli = Cli::try_parse_from(["bbox", "wifi", "24", "off"]);
        match cli.map(|c| c.command) {
            Ok(Command::Wifi(args)) => {
                assert_eq!(args.band, Band::Band24);
                assert_eq!(args.state, Toggle::Off);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn parses_parental_mac() {
        let cli = Cli::try_parse_from(["bbox", "parental", "on", "--mac", "AA:BB:CC:DD:EE:01"]);
        match cli.map(|c| c.command) {
            Ok(Command::Parental(args)) => {
                assert!(args.state.enabled());
                assert_eq!(args.mac.as_deref(), Some("AA:BB:CC:DD:EE:01"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
