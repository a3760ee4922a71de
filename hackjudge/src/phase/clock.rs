//! Phase clock.
//!
//! Pure mapping from a phase window and an instant to a lifecycle state.
//! Both ends of the window are inclusive, so every instant falls into
//! exactly one of the three states.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackjudge_core::{Hackathon, Phase};

/// Lifecycle state of a phase at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// `now < startTime`
    Upcoming,
    /// `startTime <= now <= endTime`
    Active,
    /// `now > endTime`
    Completed,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Returns the lifecycle state of `phase` at `now`.
#[must_use]
pub fn status(phase: &Phase, now: DateTime<Utc>) -> PhaseStatus {
    if now < phase.start_time {
        PhaseStatus::Upcoming
    } else if now > phase.end_time {
        PhaseStatus::Completed
    } else {
        PhaseStatus::Active
    }
}

/// Returns the active phase at `now` with its index.
///
/// When windows overlap the lowest index wins.
#[must_use]
pub fn active_phase(hackathon: &Hackathon, now: DateTime<Utc>) -> Option<(usize, &Phase)> {
    hackathon
        .phases
        .iter()
        .enumerate()
        .find(|(_, phase)| status(phase, now) == PhaseStatus::Active)
}

/// One row of a hackathon's phase timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshot {
    /// Zero-based phase index
    pub index: usize,
    /// Display name
    pub name: String,
    /// State at the evaluated instant
    pub status: PhaseStatus,
    /// Window start
    pub start_time: DateTime<Utc>,
    /// Window end
    pub end_time: DateTime<Utc>,
}

/// Evaluates every phase of `hackathon` at `now`, in phase order.
#[must_use]
pub fn timeline(hackathon: &Hackathon, now: DateTime<Utc>) -> Vec<PhaseSnapshot> {
    hackathon
        .phases
        .iter()
        .enumerate()
        .map(|(index, phase)| PhaseSnapshot {
            index,
            name: phase.name.clone(),
            status: status(phase, now),
            start_time: phase.start_time,
            end_time: phase.end_time,
        })
        .collect()
}
