//! Error types for `hackjudge`
//!
//! Typed failures for scoring, elimination and the external store, plus the
//! top-level error that maps every failure to a CLI exit code.

use std::time::Duration;

use thiserror::Error;

pub use hackjudge_core::error::{ConfigError, InvalidScore, Severity, ValidationIssue};

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `hackjudge` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, snapshot validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Store error (hackathon not found, write failed)
    pub const STORAGE_ERROR: i32 = 4;

    /// Scoring rejected (bad score, unknown phase or team)
    pub const SCORE_ERROR: i32 = 5;

    /// Elimination rejected (bad count, would remove everyone)
    pub const ELIMINATION_ERROR: i32 = 6;

    /// Caller-imposed timeout elapsed
    pub const TIMEOUT: i32 = 7;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `hackjudge` operations.
///
/// Aggregates all domain-specific errors and provides exit code mapping.
#[derive(Debug, Error)]
pub enum HackJudgeError {
    /// Configuration or snapshot validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store error outside a scoring or elimination call
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Phase selection error
    #[error(transparent)]
    Phase(#[from] PhaseNotFound),

    /// Scoring error
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Elimination error
    #[error(transparent)]
    Elimination(#[from] EliminationError),

    /// The caller's timeout elapsed before the engine answered
    #[error("operation timed out after {0}")]
    Timeout(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HackJudgeError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Store(_) => ExitCode::STORAGE_ERROR,
            Self::Timeout(_)
            | Self::Score(ScoreError::TimedOut(_))
            | Self::Elimination(EliminationError::TimedOut(_)) => ExitCode::TIMEOUT,
            Self::Phase(_) | Self::Score(_) => ExitCode::SCORE_ERROR,
            Self::Elimination(_) => ExitCode::ELIMINATION_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Phase Selection
// ============================================================================

/// A phase index or name that does not resolve against the phase sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("phase not found: {selector}{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
pub struct PhaseNotFound {
    /// The index or name as given
    pub selector: String,
    /// Closest phase name, when one is similar enough
    pub suggestion: Option<String>,
}

impl PhaseNotFound {
    /// Error for an out-of-range phase index.
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self {
            selector: index.to_string(),
            suggestion: None,
        }
    }
}

// ============================================================================
// Store Errors
// ============================================================================

/// Failures reported by a [`HackathonStore`](crate::store::HackathonStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No hackathon with this code
    #[error("hackathon not found: {0}")]
    NotFound(String),

    /// Underlying I/O failed
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored snapshot could not be decoded or failed validation
    #[error("corrupt snapshot for '{code}': {message}")]
    Corrupt {
        /// Hackathon code
        code: String,
        /// What is wrong with it
        message: String,
    },

    /// The write no longer applies to the stored state
    #[error("write conflict on '{code}': {message}")]
    Conflict {
        /// Hackathon code
        code: String,
        /// What changed underneath the writer
        message: String,
    },

    /// The backend refused the write
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Scoring Errors
// ============================================================================

/// Reasons a score cannot be recorded.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Not an integer in `[0, 100]`
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),

    /// Phase index outside the phase sequence
    #[error(transparent)]
    PhaseNotFound(#[from] PhaseNotFound),

    /// No registration with this team id
    #[error("team not found: {0}")]
    TeamNotFound(String),

    /// The store read or write failed; the previous score is intact
    #[error("storage failure: {0}")]
    StorageFailure(#[source] StoreError),

    /// The lock or snapshot read did not finish in time; nothing was written
    #[error("timed out after {} before writing the score", waited(.0))]
    TimedOut(Duration),
}

// ============================================================================
// Elimination Errors
// ============================================================================

/// Reasons an elimination cannot be applied.
#[derive(Debug, Error)]
pub enum EliminationError {
    /// Count is zero or negative
    #[error("invalid elimination count {0}: must be a positive integer")]
    InvalidCount(i64),

    /// The request would leave no team in the ranked view
    #[error("cannot eliminate all {ranked} ranked team(s) (requested {requested})")]
    CannotEliminateAll {
        /// Teams requested for removal
        requested: usize,
        /// Teams in the ranked view
        ranked: usize,
    },

    /// Phase index outside the phase sequence
    #[error(transparent)]
    PhaseNotFound(#[from] PhaseNotFound),

    /// The store read or write failed; no registration was removed
    #[error("storage failure: {0}")]
    StorageFailure(#[source] StoreError),

    /// The lock or snapshot read did not finish in time; nothing was removed
    #[error("timed out after {} before removing any team", waited(.0))]
    TimedOut(Duration),
}

fn waited(limit: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*limit)
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `hackjudge` operations.
pub type Result<T> = std::result::Result<T, HackJudgeError>;

// ============================================================================
// Tests
// ============================================================================
