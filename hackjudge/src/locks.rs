//! Per-hackathon lock registry.
//!
//! Scoring holds its hackathon's lock shared plus the mutex of its own
//! (team, phase) slot, so writes to different slots run side by side while
//! writes to one slot are serialized. Elimination holds the hackathon lock
//! exclusively across its read-rank-write span, which both waits for
//! in-flight scoring and keeps new scoring out until it finishes.
//!
//! Locks are acquired in that order (hackathon, then slot) everywhere.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use hackjudge_core::TeamId;

/// Key of one scoring slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// Hackathon code
    pub code: String,
    /// Team id
    pub team_id: TeamId,
    /// Phase index
    pub phase_index: usize,
}

/// Held while a score is validated and written.
///
/// Fields drop in declaration order, releasing the slot before the
/// hackathon lock.
#[derive(Debug)]
pub struct ScoreGuard {
    _slot: OwnedMutexGuard<()>,
    _hackathon: OwnedRwLockReadGuard<()>,
}

/// Held while an elimination runs.
#[derive(Debug)]
pub struct EliminationGuard {
    _hackathon: OwnedRwLockWriteGuard<()>,
}

/// Lock registry keyed by hackathon code and by scoring slot.
#[derive(Debug, Default)]
pub struct HackathonLocks {
    hackathons: DashMap<String, Arc<RwLock<()>>>,
    slots: DashMap<SlotKey, Arc<Mutex<()>>>,
}

impl HackathonLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for shared access to `code` and exclusive access to the slot.
    pub async fn score(&self, code: &str, team_id: &TeamId, phase_index: usize) -> ScoreGuard {
        let hackathon = self.hackathon_lock(code).read_owned().await;
        let key = SlotKey {
            code: code.to_string(),
            team_id: team_id.clone(),
            phase_index,
        };
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        ScoreGuard {
            _slot: slot.lock_owned().await,
            _hackathon: hackathon,
        }
    }

    /// Waits for exclusive access to `code`.
    pub async fn eliminate(&self, code: &str) -> EliminationGuard {
        EliminationGuard {
            _hackathon: self.hackathon_lock(code).write_owned().await,
        }
    }

    /// Drops slot entries of removed teams.
    ///
    /// Call while holding the [`EliminationGuard`] for `code`.
    pub fn forget_teams(&self, code: &str, team_ids: &[TeamId]) {
        self.slots
            .retain(|key, _| key.code != code || !team_ids.contains(&key.team_id));
    }

    /// Number of scoring slots currently tracked.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn hackathon_lock(&self, code: &str) -> Arc<RwLock<()>> {
        self.hackathons
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}
