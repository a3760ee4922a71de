//! In-memory store.
//!
//! Aggregates live in a `DashMap` keyed by hackathon code. Each write runs
//! inside a single shard guard on a scratch copy that is swapped in only on
//! success, so readers never observe a half-applied write.

use dashmap::DashMap;

use hackjudge_core::Hackathon;

use crate::error::StoreError;
use crate::judging::ScoreOutcome;

use super::{EliminationRecord, HackathonStore, Result, ScoreUpdate, apply_elimination, apply_score};

/// Process-local [`HackathonStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    hackathons: DashMap<String, Hackathon>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `hackathons`.
    #[must_use]
    pub fn with_hackathons(hackathons: impl IntoIterator<Item = Hackathon>) -> Self {
        let store = Self::new();
        for hackathon in hackathons {
            store.insert(hackathon);
        }
        store
    }

    /// Inserts or replaces an aggregate.
    pub fn insert(&self, hackathon: Hackathon) {
        self.hackathons.insert(hackathon.code.clone(), hackathon);
    }

    /// Returns a copy of the stored aggregate, if any.
    #[must_use]
    pub fn snapshot(&self, code: &str) -> Option<Hackathon> {
        self.hackathons.get(code).map(|h| h.clone())
    }

    fn modify<T>(&self, code: &str, apply: impl FnOnce(&mut Hackathon) -> Result<T>) -> Result<T> {
        let mut entry = self
            .hackathons
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;
        let mut scratch = entry.clone();
        let out = apply(&mut scratch)?;
        *entry = scratch;
        Ok(out)
    }
}

#[async_trait::async_trait]
impl HackathonStore for MemoryStore {
    async fn load(&self, code: &str) -> Result<Hackathon> {
        self.snapshot(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome> {
        self.modify(&update.code, |h| apply_score(h, update))
    }

    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize> {
        self.modify(&record.code, |h| apply_elimination(h, record))
    }

    async fn list_codes(&self) -> Result<Vec<String>> {
        let mut codes: Vec<String> = self.hackathons.iter().map(|e| e.key().clone()).collect();
        codes.sort();
        Ok(codes)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
