//! CLI argument definitions
//!
//! All Clap derive structs for `hackjudge` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::phase::PhaseSelector;

// ============================================================================
// Root CLI
// ============================================================================

/// Phase-scoped judging, leaderboards and eliminations for hackathons.
#[derive(Parser, Debug)]
#[command(name = "hackjudge", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "HACKJUDGE_COLOR")]
    pub color: ColorChoice,

    /// Log line format on stderr.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,

    /// Engine configuration file (YAML).
    #[arg(long, global = true, env = "HACKJUDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of hackathon snapshots (`<code>.json`).
    #[arg(long, global = true, env = "HACKJUDGE_STORE")]
    pub store: Option<PathBuf>,

    /// Append JSONL audit events to this file (`-` for stderr).
    #[arg(long, global = true, env = "HACKJUDGE_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Give up waiting for locks or a snapshot read after this long (e.g. `5s`).
    /// A write that has started always completes.
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the hackathons in the store.
    List(ListArgs),

    /// Show a hackathon's phases and which one is active.
    Phases(PhasesArgs),

    /// Record a judge's score for one team in one phase.
    Score(ScoreArgs),

    /// Show the overall or per-phase leaderboard.
    Leaderboard(LeaderboardArgs),

    /// Eliminate the lowest-scoring teams.
    Eliminate(EliminateArgs),

    /// Validate hackathon snapshot files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Judging Commands
// ============================================================================

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `phases`.
#[derive(Args, Debug)]
pub struct PhasesArgs {
    /// Hackathon code.
    pub code: String,

    /// Evaluate statuses at this RFC 3339 instant instead of now.
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `score`.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Hackathon code.
    pub code: String,

    /// Team id.
    #[arg(long)]
    pub team: String,

    /// Phase index or name.
    #[arg(long)]
    pub phase: PhaseSelector,

    /// Score, an integer from 0 to 100.
    #[arg(long, allow_hyphen_values = true)]
    pub score: String,

    /// Principal recording the score.
    #[arg(long = "as", value_name = "PRINCIPAL", env = "HACKJUDGE_PRINCIPAL")]
    pub principal: String,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `leaderboard`.
#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Hackathon code.
    pub code: String,

    /// Rank one phase (index or name) instead of the overall total.
    #[arg(long)]
    pub phase: Option<PhaseSelector>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `eliminate`.
#[derive(Args, Debug)]
pub struct EliminateArgs {
    /// Hackathon code.
    pub code: String,

    /// Rank one phase (index or name) instead of the overall total.
    #[arg(long)]
    pub phase: Option<PhaseSelector>,

    /// Number of teams to cut; ties at the cutoff are cut too.
    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,

    /// Principal running the elimination.
    #[arg(long = "as", value_name = "PRINCIPAL", env = "HACKJUDGE_PRINCIPAL")]
    pub principal: String,

    /// Show what would be removed without removing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Snapshot files (JSON or YAML).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}
