//! Submission accessor.
//!
//! Locates a team's record for one phase. A record whose deliverables are
//! empty is a draft (or a judge-created score holder) and does not count
//! as submitted.

use serde::Serialize;

use hackjudge_core::{Registration, Score, Submission};

/// Returns the team's submission for `phase_index`, if any.
#[must_use]
pub fn find_submission(team: &Registration, phase_index: usize) -> Option<&Submission> {
    team.submissions
        .iter()
        .find(|s| s.phase_index == phase_index)
}

/// Mutable variant of [`find_submission`].
pub fn find_submission_mut(team: &mut Registration, phase_index: usize) -> Option<&mut Submission> {
    team.submissions
        .iter_mut()
        .find(|s| s.phase_index == phase_index)
}

/// Whether the team handed in at least one deliverable for `phase_index`.
#[must_use]
pub fn has_submission(team: &Registration, phase_index: usize) -> bool {
    find_submission(team, phase_index).is_some_and(|s| !s.deliverables.is_empty())
}

/// Grading state of a team for one phase, as shown to judges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "score", rename_all = "camelCase")]
pub enum JudgingStatus {
    /// Nothing handed in and nothing scored
    NoSubmission,
    /// Deliverables present, no score yet
    AwaitingScore,
    /// A score is recorded
    Scored(Score),
}

impl std::fmt::Display for JudgingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSubmission => f.write_str("no submission"),
            Self::AwaitingScore => f.write_str("awaiting score"),
            Self::Scored(_) => f.write_str("scored"),
        }
    }
}

/// Returns the grading state of `team` for `phase_index`.
///
/// A recorded score wins even when no deliverable was handed in.
#[must_use]
pub fn judging_status(team: &Registration, phase_index: usize) -> JudgingStatus {
    match find_submission(team, phase_index) {
        Some(Submission {
            score: Some(score), ..
        }) => JudgingStatus::Scored(*score),
        Some(s) if !s.deliverables.is_empty() => JudgingStatus::AwaitingScore,
        _ => JudgingStatus::NoSubmission,
    }
}

/// What an upsert did to the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Score held before the write
    pub previous: Option<Score>,
    /// Whether a bare record had to be created
    pub created: bool,
}

/// Sets the team's score for `phase_index`, creating a bare record when the
/// team has none for that phase.
///
/// Never appends a second record for the same phase.
pub fn upsert_score(team: &mut Registration, phase_index: usize, score: Score) -> ScoreOutcome {
    if let Some(existing) = find_submission_mut(team, phase_index) {
        let previous = existing.score.replace(score);
        return ScoreOutcome {
            previous,
            created: false,
        };
    }
    team.submissions
        .push(Submission::scored_only(phase_index, score));
    ScoreOutcome {
        previous: None,
        created: true,
    }
}
