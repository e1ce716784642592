//! Clap derive structures for the `aqsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aqsync -- plan/apply reconciliation of a declared graph into Ardoq
#[derive(Debug, Parser)]
#[command(
    name = "aqsync",
    version,
    about = "Reconcile a declared component graph with Ardoq workspaces",
    long_about = "Reconcile a declared graph of components and references with the\n\
        workspaces of an Ardoq organization.\n\n\
        `plan` shows what would change; `apply` makes the remote graph match.\n\
        Entities are matched by customId; anything without one is left alone.",
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
    /// Profile to use
    #[arg(long, short = 'p', env = "AQSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service URL (overrides profile)
    #[arg(long, env = "AQSYNC_URL", global = true)]
    pub url: Option<String>,

    /// Organization label (overrides profile)
    #[arg(long, env = "AQSYNC_ORG", global = true)]
    pub org: Option<String>,

    /// API token
    #[arg(long, env = "AQSYNC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Workspace mapping NAME=ID (repeatable, overrides profile entries)
    #[arg(
        long = "workspace",
        short = 'w',
        value_name = "NAME=ID",
        value_parser = parse_workspace,
        global = true
    )]
    pub workspaces: Vec<(String, String)>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AQSYNC_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "AQSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

fn parse_workspace(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, id)) if !name.is_empty() && !id.is_empty() => {
            Ok((name.to_owned(), id.to_owned()))
        }
        _ => Err(format!("expected NAME=ID, got '{raw}'")),
    }
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
    /// One change per line (scripting)
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the changes needed to make the remote graph match a graph file
    Plan(PlanArgs),

    /// Apply a graph file to the remote workspaces
    Apply(ApplyArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLAN / APPLY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Graph file (JSON, or YAML by .yaml/.yml extension)
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Graph file (JSON, or YAML by .yaml/.yml extension)
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,
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
    /// Create or extend the config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an API token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
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
