//! Clap derive structures for the `ringlink` CLI.
//!
//! Also compiled by `build.rs` for man pages, so nothing here may depend
//! on crates outside clap + clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ringlink -- talk to a Ring Alarm hub over its real-time socket
#[derive(Debug, Parser)]
#[command(
    name = "ringlink",
    version,
    about = "Query and arm a Ring Alarm hub from the command line",
    long_about = "Queries device state and switches the security panel mode of a Ring Alarm\n\
        location. Every operation asks the connection endpoint for a fresh socket,\n\
        sends one frame and waits a bounded window for the hub to answer.",
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
    /// Location profile to use
    #[arg(long, short = 'p', env = "RINGLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Ring location id (overrides profile)
    #[arg(long, short = 'l', env = "RINGLINK_LOCATION", global = true)]
    pub location: Option<String>,

    /// OAuth access token for the connection endpoint
    #[arg(long, env = "RINGLINK_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Security panel zid (skips discovery)
    #[arg(long, env = "RINGLINK_ZID", global = true)]
    pub zid: Option<String>,

    /// Connection endpoint URL
    #[arg(long, env = "RINGLINK_CONNECTIONS_URL", global = true, hide = true)]
    pub connections_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RINGLINK_OUTPUT",
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

    /// HTTP timeout for the connection endpoint, in seconds
    #[arg(long, env = "RINGLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// How long a device query waits for the hub, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub query_window: Option<u64>,

    /// How long a mode command waits for an update, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub command_window: Option<u64>,

    /// Stop at the first matching frame or wait out the whole window
    #[arg(long, global = true)]
    pub wait: Option<WaitMode>,
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaitMode {
    /// Return as soon as a matching frame arrives
    FirstMatch,
    /// Keep listening until the window closes; the last match wins
    FullWindow,
}

impl WaitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstMatch => "first-match",
            Self::FullWindow => "full-window",
        }
    }
}

/// Panel modes as typed on the command line. Hub spellings are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Arm perimeter sensors only
    #[value(alias = "some")]
    Home,
    /// Arm everything
    #[value(alias = "all")]
    Away,
    /// Disarm
    #[value(alias = "none", alias = "disarm")]
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List devices and their current state
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Print the raw device snapshot returned by the hub
    Snapshot,

    /// Show the security panel mode and faulted sensors
    #[command(alias = "status")]
    Panel,

    /// Switch the security panel mode
    #[command(alias = "arm")]
    Mode(ModeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only show faulted devices
    #[arg(long, short = 'f')]
    pub faulted: bool,

    /// Only show devices of this type (e.g. "sensor.contact")
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub device_type: Option<String>,
}

// ── Mode ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModeArgs {
    /// Target mode
    pub mode: ModeArg,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a profile with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an access token in the system keyring (for --profile)
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
