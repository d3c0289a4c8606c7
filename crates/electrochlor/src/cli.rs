//! Clap derive structures for the `electrochlor` CLI.
//!
//! Defines the command tree, global flags, and shared value types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// electrochlor -- read and control a Waterco Electrochlor pool controller
#[derive(Debug, Parser)]
#[command(
    name = "electrochlor",
    version,
    about = "Monitor and control Electrochlor pool controllers over the local network",
    long_about = "Reads sensors and actuator state from a Waterco Electrochlor \
        chlorinator's local HTTP API,\nand switches the pump, lights, valve and \
        auxiliary output with read-back verification.",
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
    /// Device profile to use
    #[arg(long, short = 'd', env = "ELECTROCHLOR_DEVICE", global = true)]
    pub device: Option<String>,

    /// Device hostname or IP address (overrides profile)
    #[arg(long, short = 'H', env = "ELECTROCHLOR_HOST", global = true)]
    pub host: Option<String>,

    /// Device HTTP port (overrides profile)
    #[arg(long, env = "ELECTROCHLOR_PORT", global = true)]
    pub port: Option<u16>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ELECTROCHLOR_OUTPUT",
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
    #[arg(long, env = "ELECTROCHLOR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain `key=value` lines (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll once and show every sensor, binary sensor and switch
    #[command(alias = "st")]
    Status,

    /// Turn an actuator on or off and wait for the device to confirm
    #[command(alias = "sw")]
    Switch(SwitchArgs),

    /// Poll on the configured interval and print each update
    Watch(WatchArgs),

    /// Print the normalized status document
    Raw,

    /// Manage CLI configuration and device profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SWITCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SwitchArgs {
    /// Actuator to switch
    pub target: SwitchTarget,

    /// Requested state
    pub state: OnOff,

    /// Seconds to wait for the device to report the new state
    #[arg(long)]
    pub verify_timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchTarget {
    Pump,
    Light,
    Valve,
    Aux2,
}

impl SwitchTarget {
    /// Status key of the switch this target drives.
    pub fn key(self) -> &'static str {
        match self {
            Self::Pump => "pump",
            Self::Light => "light",
            Self::Valve => "valve",
            Self::Aux2 => "aux2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn as_bool(self) -> bool {
        self == Self::On
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Add or replace a device profile
    Add {
        /// Profile name
        name: String,

        /// Device hostname or IP address
        #[arg(long)]
        host: String,

        /// Device HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Seconds between scheduled polls (0 disables polling)
        #[arg(long)]
        scan_interval: Option<u64>,

        /// Make this the default device
        #[arg(long)]
        default: bool,
    },

    /// Remove a device profile
    Remove {
        /// Profile name
        name: String,
    },

    /// Set the default device
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
