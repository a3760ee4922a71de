//! Leaderboard builder.
//!
//! Ranked views recomputed from the snapshot on every call. Ordering is
//! score descending, then team id ascending, so equal inputs always produce
//! the same ranking.

use serde::Serialize;

use hackjudge_core::{Hackathon, Registration, TeamId};

use crate::error::PhaseNotFound;

use super::submission::{JudgingStatus, has_submission, judging_status};

/// Which submissions a ranked view aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaderboardScope {
    /// Sum over every phase, every team
    Overall,
    /// One phase, submitting teams only
    Phase(usize),
}

impl std::fmt::Display for LeaderboardScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overall => f.write_str("overall"),
            Self::Phase(i) => write!(f, "phase {i}"),
        }
    }
}

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Competition rank: equal scores share a rank, the next rank skips
    pub rank: usize,
    /// Team id
    pub team_id: TeamId,
    /// Team display name
    pub team_name: String,
    /// Score within the scope; unscored submissions count as 0
    pub score: u32,
    /// Leader plus members
    pub member_count: usize,
    /// Whether deliverables were handed in within the scope
    pub has_submission: bool,
    /// Grading state in a phase view; absent from the overall view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judging: Option<JudgingStatus>,
}

/// A ranked view plus the number of submissions still waiting for a grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    /// Scope the view was built for
    pub scope: LeaderboardScope,
    /// Entries, best first
    pub entries: Vec<LeaderboardEntry>,
    /// Submitted-but-unscored submissions within the scope; they rank as 0
    pub pending_grades: usize,
}

impl Leaderboard {
    /// Number of ranked teams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no team is ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ranks teams that submitted for `phase_index` by that phase's score.
///
/// # Errors
///
/// Returns [`PhaseNotFound`] when `phase_index` is out of range.
pub fn phase_leaderboard(
    hackathon: &Hackathon,
    phase_index: usize,
) -> Result<Leaderboard, PhaseNotFound> {
    if hackathon.phase(phase_index).is_none() {
        return Err(PhaseNotFound::index(phase_index));
    }

    let mut pending_grades = 0;
    let rows = hackathon
        .registrations
        .iter()
        .filter(|team| has_submission(team, phase_index))
        .map(|team| {
            let status = judging_status(team, phase_index);
            let score = match status {
                JudgingStatus::Scored(score) => score.value(),
                JudgingStatus::AwaitingScore | JudgingStatus::NoSubmission => {
                    pending_grades += 1;
                    0
                }
            };
            row(team, score, true, Some(status))
        })
        .collect();

    let entries = rank(rows);
    tracing::debug!(
        hackathon = %hackathon.code,
        phase_index,
        ranked = entries.len(),
        pending_grades,
        "built phase leaderboard"
    );

    Ok(Leaderboard {
        scope: LeaderboardScope::Phase(phase_index),
        entries,
        pending_grades,
    })
}

/// Ranks every registered team by the sum of its recorded scores.
///
/// Teams without any submission still appear, with score 0.
#[must_use]
pub fn overall_leaderboard(hackathon: &Hackathon) -> Leaderboard {
    let mut pending_grades = 0;
    let rows = hackathon
        .registrations
        .iter()
        .map(|team| {
            pending_grades += team
                .submissions
                .iter()
                .filter(|s| s.score.is_none() && !s.deliverables.is_empty())
                .count();
            let total = team
                .submissions
                .iter()
                .filter_map(|s| s.score)
                .map(|s| s.value())
                .sum();
            let submitted = team.submissions.iter().any(|s| !s.deliverables.is_empty());
            row(team, total, submitted, None)
        })
        .collect();

    let entries = rank(rows);
    tracing::debug!(
        hackathon = %hackathon.code,
        ranked = entries.len(),
        pending_grades,
        "built overall leaderboard"
    );

    Leaderboard {
        scope: LeaderboardScope::Overall,
        entries,
        pending_grades,
    }
}

/// Builds the view for `scope`.
///
/// # Errors
///
/// Returns [`PhaseNotFound`] for a phase scope with an out-of-range index.
pub fn build_leaderboard(
    hackathon: &Hackathon,
    scope: LeaderboardScope,
) -> Result<Leaderboard, PhaseNotFound> {
    match scope {
        LeaderboardScope::Overall => Ok(overall_leaderboard(hackathon)),
        LeaderboardScope::Phase(index) => phase_leaderboard(hackathon, index),
    }
}

fn row(
    team: &Registration,
    score: u32,
    has_submission: bool,
    judging: Option<JudgingStatus>,
) -> LeaderboardEntry {
    LeaderboardEntry {
        rank: 0,
        team_id: team.team_id.clone(),
        team_name: team.team_name.clone(),
        score,
        member_count: team.member_count(),
        has_submission,
        judging,
    }
}

fn rank(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.team_id.cmp(&b.team_id)));

    let mut previous: Option<u32> = None;
    let mut current_rank = 0;
    for (position, entry) in entries.iter_mut().enumerate() {
        if previous != Some(entry.score) {
            current_rank = position + 1;
            previous = Some(entry.score);
        }
        entry.rank = current_rank;
    }
    entries
}
