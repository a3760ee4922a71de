//! Hackathon store abstraction.
//!
//! Provides the [`HackathonStore`] trait the engine persists through, plus an
//! in-memory and a JSON-file implementation. Each write method is one logical
//! write: it either applies completely or leaves the stored aggregate as it
//! was.
//!
//! Stores shared between processes also hand out leases on a hackathon, so
//! the engine's shared/exclusive discipline holds across processes and not
//! only across tasks.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::any::Any;

use serde::Serialize;

use hackjudge_core::{Hackathon, Score, TeamId};

use crate::error::StoreError;
use crate::judging::{LeaderboardScope, ScoreOutcome, upsert_score};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A score write as handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    /// Hackathon code
    pub code: String,
    /// Scored team
    pub team_id: TeamId,
    /// Scored phase
    pub phase_index: usize,
    /// Validated score
    pub score: Score,
}

/// A bulk removal as handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationRecord {
    /// Hackathon code
    pub code: String,
    /// Scope the cutoff was computed in
    pub scope: LeaderboardScope,
    /// Cutoff score
    pub cutoff_score: u32,
    /// Registrations to remove
    pub team_ids: Vec<TeamId>,
}

/// How a lease on a hackathon is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Held by score writers; any number at once
    Shared,
    /// Held by an elimination; excludes every other lease
    Exclusive,
}

/// A held lease on a hackathon; released on drop.
#[derive(Default)]
pub struct StoreLease {
    _held: Option<Box<dyn Any + Send + Sync>>,
}

impl StoreLease {
    /// A lease that holds nothing, for stores private to one process.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A lease kept alive by `resource` (a locked file handle, a guard, ...).
    #[must_use]
    pub fn holding(resource: impl Any + Send + Sync) -> Self {
        Self {
            _held: Some(Box::new(resource)),
        }
    }

    /// Whether anything is held.
    #[must_use]
    pub const fn is_held(&self) -> bool {
        self._held.is_some()
    }
}

impl std::fmt::Debug for StoreLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLease")
            .field("held", &self.is_held())
            .finish()
    }
}

/// Async persistence collaborator for hackathon aggregates.
///
/// Implementations must make each write atomic with respect to readers and
/// must not retry internally; failures are reported to the caller.
#[async_trait::async_trait]
pub trait HackathonStore: Send + Sync {
    /// Waits for a lease on `code` in `mode`.
    ///
    /// The default holds nothing: a store that only one process can reach
    /// is covered by the engine's in-process locks.
    async fn lock(&self, code: &str, mode: LockMode) -> Result<StoreLease> {
        let _ = (code, mode);
        Ok(StoreLease::none())
    }

    /// Reads the full aggregate for `code`.
    ///
    /// Returns [`StoreError::NotFound`] for an unknown code.
    async fn load(&self, code: &str) -> Result<Hackathon>;

    /// Upserts one (team, phase) score.
    ///
    /// On error the previously stored score is unchanged.
    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome>;

    /// Removes every listed registration, or none of them.
    ///
    /// Returns the number of registrations removed.
    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize>;

    /// Lists the codes of all stored hackathons, sorted.
    async fn list_codes(&self) -> Result<Vec<String>>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Applies a score update to an aggregate held by a store.
///
/// # Errors
///
/// Returns [`StoreError::Conflict`] when the phase or team no longer exists.
pub fn apply_score(hackathon: &mut Hackathon, update: &ScoreUpdate) -> Result<ScoreOutcome> {
    if hackathon.phase(update.phase_index).is_none() {
        return Err(StoreError::Conflict {
            code: update.code.clone(),
            message: format!("phase {} no longer exists", update.phase_index),
        });
    }
    let team = hackathon
        .team_mut(&update.team_id)
        .ok_or_else(|| StoreError::Conflict {
            code: update.code.clone(),
            message: format!("team {} is no longer registered", update.team_id),
        })?;
    Ok(upsert_score(team, update.phase_index, update.score))
}

/// Applies a bulk removal to an aggregate held by a store.
///
/// Checks every id first so a missing team removes nothing.
///
/// # Errors
///
/// Returns [`StoreError::Conflict`] when any listed team is not registered.
pub fn apply_elimination(hackathon: &mut Hackathon, record: &EliminationRecord) -> Result<usize> {
    if let Some(missing) = record
        .team_ids
        .iter()
        .find(|id| hackathon.team(id).is_none())
    {
        return Err(StoreError::Conflict {
            code: record.code.clone(),
            message: format!("team {missing} is no longer registered"),
        });
    }
    Ok(hackathon.remove_teams(&record.team_ids))
}
