//! Clap derive structures for the `rbxfolio` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use rbxfolio_core::OwnershipPolicy;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rbxfolio -- everything a Roblox creator owns, as one JSON document
#[derive(Debug, Parser)]
#[command(
    name = "rbxfolio",
    version,
    about = "Aggregate a Roblox user's games, groups and game passes",
    long_about = "Crawls the Roblox web APIs starting from a user id or username and prints\n\
        a consolidated JSON view: games on the profile, games of owned groups,\n\
        and the game passes of each. Failed branches are reported as empty lists.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "RBXFOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "json", global = true)]
    pub output: OutputFormat,

    /// Which group roles count as ownership (overrides config)
    #[arg(long, global = true)]
    pub ownership: Option<OwnershipPolicy>,

    /// Aggregation timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a user id or username
    Whois(IdentityArgs),

    /// List games on the profile and in owned groups
    #[command(alias = "games")]
    Resources(IdentityArgs),

    /// List the game passes of every owned game
    #[command(alias = "gamepasses")]
    Passes(PassesArgs),

    /// Inspect and manage configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Numeric user id or username
    pub identity: String,
}

#[derive(Debug, Args)]
pub struct PassesArgs {
    #[command(flatten)]
    pub target: IdentityArgs,

    /// Omit games that have no passes
    #[arg(long)]
    pub non_empty: bool,
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
    /// Print the effective configuration (secrets masked)
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Store the .ROBLOSECURITY cookie in the system keyring (read from stdin)
    SetCookie,
    /// Remove the stored cookie from the system keyring
    ClearCookie,
}
