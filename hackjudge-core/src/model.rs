//! Hackathon data model.
//!
//! Snapshots of a hackathon aggregate as exchanged with the external store:
//! the ordered phase sequence, the registered teams and each team's
//! per-phase submissions. Field names serialize in `camelCase` to match the
//! records produced by the front-end API.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::InvalidScore;

// ============================================================================
// Identifiers and Scores
// ============================================================================

/// Newtype wrapper for team identifiers.
///
/// Ordering is lexicographic and is used as the deterministic leaderboard
/// tie-break.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl TeamId {
    /// Creates a new `TeamId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A judge-assigned score, always within `[0, 100]`.
///
/// The only constructors validate the range, so a `Score` in hand is
/// always valid. Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Lowest accepted score.
    pub const MIN: u8 = 0;

    /// Highest accepted score.
    pub const MAX: u8 = 100;

    /// Parses a raw score as entered by a judge.
    ///
    /// Surrounding whitespace is ignored. Anything that is not an integer
    /// in `[0, 100]` is rejected, including decimals such as `"7.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScore`] carrying the raw input.
    pub fn parse(raw: &str) -> Result<Self, InvalidScore> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| Self::try_from(v).ok())
            .ok_or_else(|| InvalidScore {
                raw: raw.to_owned(),
            })
    }

    /// Returns the score as a `u32`, the unit leaderboard sums are kept in.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<i64> for Score {
    type Error = InvalidScore;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| InvalidScore {
                raw: value.to_string(),
            })
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// A hackathon aggregate: phases in order plus registered teams.
///
/// Phases are addressed by zero-based position everywhere in the engine;
/// their names are display keys only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hackathon {
    /// Unique hackathon code.
    pub code: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Principals allowed to score and eliminate (checked upstream).
    #[serde(default)]
    pub admins: Vec<String>,

    /// Ordered phase sequence.
    #[serde(default)]
    pub phases: Vec<Phase>,

    /// Registered teams.
    #[serde(default)]
    pub registrations: Vec<Registration>,
}

impl Hackathon {
    /// Returns the phase at `index`, if any.
    #[must_use]
    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    /// Looks up a registered team by id.
    #[must_use]
    pub fn team(&self, team_id: &TeamId) -> Option<&Registration> {
        self.registrations.iter().find(|r| &r.team_id == team_id)
    }

    /// Looks up a registered team by id for mutation.
    pub fn team_mut(&mut self, team_id: &TeamId) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|r| &r.team_id == team_id)
    }

    /// Removes every registration whose id is in `team_ids`.
    ///
    /// Returns the number of registrations removed.
    pub fn remove_teams(&mut self, team_ids: &[TeamId]) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| !team_ids.contains(&r.team_id));
        before - self.registrations.len()
    }
}

/// A time-boxed stage of a hackathon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase name (unique within a hackathon, display only)
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Inclusive start of the phase
    pub start_time: DateTime<Utc>,

    /// Inclusive end of the phase
    pub end_time: DateTime<Utc>,

    /// Deliverables teams are asked to hand in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<DeliverableSpec>,
}

/// Description of one deliverable a phase asks for.
///
/// Opaque to the engine; carried through for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverableSpec {
    /// Deliverable type key (e.g. `"repo"`, `"video"`)
    pub kind: String,

    /// Human-readable label
    #[serde(default)]
    pub label: String,

    /// Whether intake requires it
    #[serde(default)]
    pub required: bool,
}

/// A team's enrollment in a hackathon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Unique team id
    pub team_id: TeamId,

    /// Display name
    pub team_name: String,

    /// Team leader
    pub leader: String,

    /// Members besides the leader
    #[serde(default)]
    pub members: Vec<String>,

    /// At most one submission per phase index
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Registration {
    /// Number of people on the team, leader included.
    #[must_use]
    pub fn member_count(&self) -> usize {
        1 + self.members.len()
    }
}

/// A team's deliverables and score for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Position of the phase this submission belongs to
    pub phase_index: usize,

    /// When deliverables were handed in; absent for judge-created records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    /// Deliverable type to value (URL, text, ...)
    #[serde(default)]
    pub deliverables: IndexMap<String, String>,

    /// Judge-assigned score, absent until graded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

impl Submission {
    /// Creates a bare record holding only a score.
    ///
    /// Used when a judge scores a team that has not submitted for the phase.
    #[must_use]
    pub fn scored_only(phase_index: usize, score: Score) -> Self {
        Self {
            phase_index,
            submitted_at: None,
            deliverables: IndexMap::new(),
            score: Some(score),
        }
    }
}
