//! Clap derive structures for the `edgesync` CLI.
//!
//! Only depends on clap and clap_complete so `build.rs` can include it
//! for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// edgesync -- keep an FMC dynamic object in step with CDN edge servers
#[derive(Debug, Parser)]
#[command(
    name = "edgesync",
    version,
    about = "Sync CDN edge-server addresses into a Cisco FMC dynamic object",
    long_about = "Fetches the published BunnyCDN edge-server lists, compares them with the\n\
        mappings of an FMC dynamic object, and adds or removes only the difference.\n\n\
        Safe to run from cron or a systemd timer: an in-sync object gets no writes.",
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
    /// Config file (default: platform config dir)
    #[arg(long, env = "EDGESYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EDGESYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and suppress command output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(
        long,
        env = "EDGESYNC_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    pub log_format: LogFormat,

    /// Accept self-signed FMC certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// FMC request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Prompt for connection settings, using config values as defaults
    #[arg(long, short = 'i', global = true)]
    pub interactive: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile the dynamic object with the edge-server lists
    Sync(SyncArgs),

    /// Inspect dynamic objects on the FMC
    #[command(alias = "obj")]
    Objects(ObjectsArgs),

    /// Show or edit the mappings of one dynamic object
    #[command(alias = "map")]
    Mappings(MappingsArgs),

    /// Fetch the edge-server lists without contacting the FMC
    Sources(SourcesArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sync ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Log intended changes without sending any writes
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Also fetch the IPv6 list
    #[arg(long = "include-ipv6", short = '6')]
    pub include_ipv6: bool,

    /// Addresses per add/remove request
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Dynamic object name (overrides config)
    #[arg(long)]
    pub object: Option<String>,
}

// ── Objects ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ObjectsArgs {
    #[command(subcommand)]
    pub command: ObjectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ObjectsCommand {
    /// List all dynamic objects
    #[command(alias = "ls")]
    List,
}

// ── Mappings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MappingsCommand {
    /// Show the current mappings of an object
    Show {
        /// Object name or ID (default: configured object)
        object: Option<String>,
    },

    /// Add addresses to an object; addresses already present are skipped
    Add(EditMappingsArgs),

    /// Remove addresses from an object; absent addresses are skipped
    #[command(alias = "rm")]
    Remove(EditMappingsArgs),
}

#[derive(Debug, Args)]
pub struct EditMappingsArgs {
    /// Object name or ID
    pub object: String,

    /// Addresses or CIDR blocks
    #[arg(required = true, num_args = 1..)]
    pub addresses: Vec<String>,

    /// Log intended changes without sending any writes
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

// ── Sources ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SourcesArgs {
    #[command(subcommand)]
    pub command: SourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SourcesCommand {
    /// Fetch and print the desired address set
    Fetch {
        /// Also fetch the IPv6 list
        #[arg(long = "include-ipv6", short = '6')]
        include_ipv6: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the effective configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
