//! Scoring service rules.
//!
//! Validation runs in a fixed order (score, then phase, then team) so the
//! same bad request always yields the same error. Recording is an upsert:
//! there is exactly one current score per (team, phase).

use serde::Serialize;

use hackjudge_core::{Hackathon, Score, TeamId};

use crate::error::{PhaseNotFound, ScoreError};

use super::submission::{ScoreOutcome, upsert_score};

/// Checks a raw score request against `hackathon` without mutating it.
///
/// # Errors
///
/// - [`ScoreError::InvalidScore`] when `raw_score` is not an integer in `[0, 100]`
/// - [`ScoreError::PhaseNotFound`] when `phase_index` is out of range
/// - [`ScoreError::TeamNotFound`] when no registration has `team_id`
pub fn validate_score(
    hackathon: &Hackathon,
    team_id: &TeamId,
    phase_index: usize,
    raw_score: &str,
) -> Result<Score, ScoreError> {
    let score = Score::parse(raw_score)?;

    if hackathon.phase(phase_index).is_none() {
        return Err(PhaseNotFound::index(phase_index).into());
    }

    if hackathon.team(team_id).is_none() {
        return Err(ScoreError::TeamNotFound(team_id.to_string()));
    }

    Ok(score)
}

/// Validates and records a score on the in-memory snapshot.
///
/// # Errors
///
/// Same as [`validate_score`]; on error `hackathon` is untouched.
pub fn record_score(
    hackathon: &mut Hackathon,
    team_id: &TeamId,
    phase_index: usize,
    raw_score: &str,
) -> Result<(Score, ScoreOutcome), ScoreError> {
    let score = validate_score(hackathon, team_id, phase_index, raw_score)?;
    let team = hackathon
        .team_mut(team_id)
        .ok_or_else(|| ScoreError::TeamNotFound(team_id.to_string()))?;
    Ok((score, upsert_score(team, phase_index, score)))
}

/// Confirmation returned to the caller once a score is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReceipt {
    /// Hackathon code
    pub hackathon: String,
    /// Scored team
    pub team_id: TeamId,
    /// Scored phase
    pub phase_index: usize,
    /// Score now stored
    pub score: Score,
    /// Score replaced by this write
    pub previous: Option<Score>,
    /// Whether the write created a bare record
    pub created: bool,
}
