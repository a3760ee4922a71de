//! Judging rules
//!
//! Pure computations over an in-memory [`Hackathon`](hackjudge_core::Hackathon)
//! snapshot. Nothing here locks, blocks or touches the store; the
//! [`JudgingEngine`](crate::engine::JudgingEngine) composes these with
//! persistence.
//!
//! # Architecture
//!
//! - [`submission`]: per-(team, phase) lookup and the score upsert
//! - [`scoring`]: validation order and in-place recording of a judge's score
//! - [`leaderboard`]: per-phase and overall ranked views
//! - [`elimination`]: cutoff computation and threshold removal

pub mod elimination;
pub mod leaderboard;
pub mod scoring;
pub mod submission;

pub use elimination::{CutoffResult, check_count, eliminate, plan_elimination};
pub use leaderboard::{
    Leaderboard, LeaderboardEntry, LeaderboardScope, build_leaderboard, overall_leaderboard,
    phase_leaderboard,
};
pub use scoring::{ScoreReceipt, record_score, validate_score};
pub use submission::{
    JudgingStatus, ScoreOutcome, find_submission, has_submission, judging_status, upsert_score,
};
