//! Elimination engine rules.
//!
//! The cutoff is the score of the entry at position `len - count - 1` of the
//! ranked view, and every ranked team scoring at or below it is removed.
//! Removal is by value, not by rank: ties at the cutoff all go, so more
//! than `count` teams can be eliminated.

use serde::Serialize;

use hackjudge_core::{Hackathon, TeamId};

use crate::error::EliminationError;

use super::leaderboard::{LeaderboardScope, build_leaderboard};

/// Outcome of an elimination, returned for caller confirmation and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutoffResult {
    /// Scope the ranking was computed in
    pub scope: LeaderboardScope,
    /// Teams scoring at or below this are eliminated
    pub cutoff_score: u32,
    /// Eliminated teams, in leaderboard order
    pub eliminated: Vec<TeamId>,
    /// Registrations left in the hackathon afterwards
    pub remaining: usize,
}

/// Checks that an elimination count is a positive integer.
///
/// # Errors
///
/// Returns [`EliminationError::InvalidCount`] when `count < 1`.
pub fn check_count(count: i64) -> Result<usize, EliminationError> {
    usize::try_from(count)
        .ok()
        .filter(|c| *c > 0)
        .ok_or(EliminationError::InvalidCount(count))
}

/// Computes the cutoff and the elimination set without mutating anything.
///
/// # Errors
///
/// - [`EliminationError::InvalidCount`] when `count < 1`
/// - [`EliminationError::PhaseNotFound`] for an out-of-range phase scope
/// - [`EliminationError::CannotEliminateAll`] when `count` reaches the size of
///   the ranked view, or when ties at the cutoff would sweep the whole view
pub fn plan_elimination(
    hackathon: &Hackathon,
    scope: LeaderboardScope,
    count: i64,
) -> Result<CutoffResult, EliminationError> {
    let requested = check_count(count)?;

    let board = build_leaderboard(hackathon, scope)?;
    let ranked = board.len();
    if requested >= ranked {
        return Err(EliminationError::CannotEliminateAll { requested, ranked });
    }

    let cutoff_score = board.entries[ranked - requested - 1].score;
    let eliminated: Vec<TeamId> = board
        .entries
        .iter()
        .filter(|e| e.score <= cutoff_score)
        .map(|e| e.team_id.clone())
        .collect();

    if eliminated.len() == ranked {
        return Err(EliminationError::CannotEliminateAll { requested, ranked });
    }

    let remaining = hackathon.registrations.len() - eliminated.len();
    Ok(CutoffResult {
        scope,
        cutoff_score,
        eliminated,
        remaining,
    })
}

/// Plans the elimination and removes the eliminated registrations.
///
/// # Errors
///
/// Same as [`plan_elimination`]; on error `hackathon` is untouched.
pub fn eliminate(
    hackathon: &mut Hackathon,
    scope: LeaderboardScope,
    count: i64,
) -> Result<CutoffResult, EliminationError> {
    let result = plan_elimination(hackathon, scope, count)?;
    hackathon.remove_teams(&result.eliminated);
    Ok(result)
}
