//! Judging engine.
//!
//! `JudgingEngine` composes the pure judging rules with a
//! [`HackathonStore`], the lock registry and the audit trail. Every call
//! reads a fresh snapshot from the store; nothing is cached between calls.
//!
//! Mutating calls take an explicit [`Principal`]. Authorization happens
//! before the engine is reached; the principal is only recorded.
//!
//! A mutating call holds the in-process lock and a store lease (shared for
//! scoring, exclusive for elimination) from its snapshot read until its
//! write returns. An engine timeout bounds only the wait for those locks and
//! the read: once the write starts it runs to completion, so a timed-out
//! call has never changed the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use hackjudge_core::{Hackathon, Score, TeamId};

use crate::error::{EliminationError, HackJudgeError, ScoreError, StoreError};
use crate::judging::{
    CutoffResult, Leaderboard, LeaderboardScope, ScoreReceipt, build_leaderboard, check_count,
    plan_elimination, validate_score,
};
use crate::locks::HackathonLocks;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::phase::{PhaseSnapshot, active_phase, timeline};
use crate::store::{EliminationRecord, HackathonStore, LockMode, ScoreUpdate, StoreLease};

/// The identity on whose behalf a mutating call runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Creates a principal from an opaque identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phase timeline of one hackathon at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimeline {
    /// Hackathon code
    pub hackathon: String,
    /// Instant the statuses were computed for
    pub at: DateTime<Utc>,
    /// Index of the active phase, lowest wins on overlap
    pub active: Option<usize>,
    /// Every phase with its status
    pub phases: Vec<PhaseSnapshot>,
}

/// Judging facade over a hackathon store.
pub struct JudgingEngine {
    store: Arc<dyn HackathonStore>,
    locks: HackathonLocks,
    events: Arc<EventEmitter>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for JudgingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgingEngine")
            .field("store", &self.store.backend())
            .field("locks", &self.locks)
            .field("events", &self.events)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JudgingEngine {
    /// Creates an engine over `store` that discards audit events.
    #[must_use]
    pub fn new(store: Arc<dyn HackathonStore>) -> Self {
        Self {
            store,
            locks: HackathonLocks::new(),
            events: Arc::new(EventEmitter::noop()),
            timeout: None,
        }
    }

    /// Sends audit events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// Bounds how long a mutating call may wait for its locks and snapshot.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lists the codes of every stored hackathon, sorted.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn codes(&self) -> Result<Vec<String>, StoreError> {
        self.store
            .list_codes()
            .await
            .inspect_err(|_| metrics::record_storage_failure("list_codes"))
    }

    /// Reads the current snapshot of `code`.
    ///
    /// # Errors
    ///
    /// Propagates the store's error, [`StoreError::NotFound`] included.
    pub async fn hackathon(&self, code: &str) -> Result<Hackathon, StoreError> {
        self.store.load(code).await.inspect_err(|e| {
            if !matches!(e, StoreError::NotFound(_)) {
                metrics::record_storage_failure("load");
            }
        })
    }

    /// Returns every phase of `code` with its status at `now`.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn phase_timeline(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<PhaseTimeline, StoreError> {
        let hackathon = self.hackathon(code).await?;
        Ok(PhaseTimeline {
            active: active_phase(&hackathon, now).map(|(i, _)| i),
            phases: timeline(&hackathon, now),
            hackathon: hackathon.code,
            at: now,
        })
    }

    /// Builds the ranked view for `scope` from the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HackJudgeError::Store`] if the snapshot cannot be read and
    /// [`HackJudgeError::Phase`] for an out-of-range phase scope.
    pub async fn leaderboard(
        &self,
        code: &str,
        scope: LeaderboardScope,
    ) -> Result<Leaderboard, HackJudgeError> {
        let hackathon = self.hackathon(code).await?;
        Ok(build_leaderboard(&hackathon, scope)?)
    }

    /// Validates and persists one judge's score for a (team, phase) slot.
    ///
    /// Validation order is score, phase, team. On any error the previously
    /// stored score is unchanged.
    ///
    /// # Errors
    ///
    /// - [`ScoreError::InvalidScore`] when `raw_score` is not an integer in `[0, 100]`
    /// - [`ScoreError::PhaseNotFound`] / [`ScoreError::TeamNotFound`]
    /// - [`ScoreError::StorageFailure`] when the read or write fails
    /// - [`ScoreError::TimedOut`] when the engine timeout elapses before the write
    pub async fn record_score(
        &self,
        principal: &Principal,
        code: &str,
        team_id: &TeamId,
        phase_index: usize,
        raw_score: &str,
    ) -> Result<ScoreReceipt, ScoreError> {
        Score::parse(raw_score)?;

        let (_guard, _lease, hackathon) = self
            .before_write("record_score", ScoreError::TimedOut, async {
                let guard = self.locks.score(code, team_id, phase_index).await;
                let lease = self
                    .lease("record_score", code, LockMode::Shared)
                    .await
                    .map_err(ScoreError::StorageFailure)?;
                let hackathon = self
                    .load_for("record_score", code)
                    .await
                    .map_err(ScoreError::StorageFailure)?;
                Ok::<_, ScoreError>((guard, lease, hackathon))
            })
            .await?;
        let score = validate_score(&hackathon, team_id, phase_index, raw_score)?;

        let update = ScoreUpdate {
            code: code.to_string(),
            team_id: team_id.clone(),
            phase_index,
            score,
        };
        let outcome = self.store.write_score(&update).await.map_err(|e| {
            metrics::record_storage_failure("write_score");
            warn!(
                hackathon = %code,
                team = %team_id,
                phase_index,
                error = %e,
                "score write failed"
            );
            ScoreError::StorageFailure(e)
        })?;

        info!(
            hackathon = %code,
            team = %team_id,
            phase_index,
            score = %score,
            previous = ?outcome.previous.map(u8::from),
            principal = %principal,
            "score recorded"
        );
        metrics::record_score(code, outcome.created);
        self.events.emit(Event::ScoreRecorded {
            timestamp: Utc::now(),
            principal: principal.to_string(),
            hackathon: code.to_string(),
            team_id: team_id.clone(),
            phase_index,
            score: score.into(),
            previous: outcome.previous.map(u8::from),
        });

        Ok(ScoreReceipt {
            hackathon: code.to_string(),
            team_id: team_id.clone(),
            phase_index,
            score,
            previous: outcome.previous,
            created: outcome.created,
        })
    }

    /// Computes what [`eliminate`](Self::eliminate) would remove, without
    /// writing anything.
    ///
    /// # Errors
    ///
    /// Same as [`eliminate`](Self::eliminate).
    pub async fn preview_elimination(
        &self,
        code: &str,
        scope: LeaderboardScope,
        count: i64,
    ) -> Result<CutoffResult, EliminationError> {
        check_count(count)?;
        let hackathon = self
            .load_for("preview_elimination", code)
            .await
            .map_err(EliminationError::StorageFailure)?;
        plan_elimination(&hackathon, scope, count)
    }

    /// Removes every team in the scope's view scoring at or below the cutoff.
    ///
    /// Runs exclusively for `code`: it waits for in-flight scoring and no
    /// score is written until it finishes. On any error no registration is
    /// removed.
    ///
    /// # Errors
    ///
    /// - [`EliminationError::InvalidCount`] when `count < 1`
    /// - [`EliminationError::PhaseNotFound`] for an out-of-range phase scope
    /// - [`EliminationError::CannotEliminateAll`] when the view would be emptied
    /// - [`EliminationError::StorageFailure`] when the read or write fails
    /// - [`EliminationError::TimedOut`] when the engine timeout elapses before the write
    pub async fn eliminate(
        &self,
        principal: &Principal,
        code: &str,
        scope: LeaderboardScope,
        count: i64,
    ) -> Result<CutoffResult, EliminationError> {
        let result = self.eliminate_locked(code, scope, count).await;

        match &result {
            Ok(cutoff) => {
                info!(
                    hackathon = %code,
                    scope = %scope,
                    cutoff = cutoff.cutoff_score,
                    eliminated = cutoff.eliminated.len(),
                    remaining = cutoff.remaining,
                    principal = %principal,
                    "teams eliminated"
                );
                metrics::record_elimination(code, scope_kind(scope), cutoff.eliminated.len());
                self.events.emit(Event::TeamsEliminated {
                    timestamp: Utc::now(),
                    principal: principal.to_string(),
                    hackathon: code.to_string(),
                    scope: scope.to_string(),
                    requested: count,
                    cutoff_score: cutoff.cutoff_score,
                    eliminated: cutoff.eliminated.clone(),
                    remaining: cutoff.remaining,
                });
            }
            Err(e) => {
                warn!(
                    hackathon = %code,
                    scope = %scope,
                    count,
                    principal = %principal,
                    error = %e,
                    "elimination rejected"
                );
                self.events.emit(Event::EliminationRejected {
                    timestamp: Utc::now(),
                    principal: principal.to_string(),
                    hackathon: code.to_string(),
                    requested: count,
                    reason: e.to_string(),
                });
            }
        }

        result
    }

    async fn eliminate_locked(
        &self,
        code: &str,
        scope: LeaderboardScope,
        count: i64,
    ) -> Result<CutoffResult, EliminationError> {
        check_count(count)?;

        let (_guard, _lease, hackathon) = self
            .before_write("eliminate", EliminationError::TimedOut, async {
                let guard = self.locks.eliminate(code).await;
                let lease = self
                    .lease("eliminate", code, LockMode::Exclusive)
                    .await
                    .map_err(EliminationError::StorageFailure)?;
                let hackathon = self
                    .load_for("eliminate", code)
                    .await
                    .map_err(EliminationError::StorageFailure)?;
                Ok::<_, EliminationError>((guard, lease, hackathon))
            })
            .await?;
        let plan = plan_elimination(&hackathon, scope, count)?;
        debug!(
            hackathon = %code,
            cutoff = plan.cutoff_score,
            candidates = plan.eliminated.len(),
            "elimination planned"
        );

        let record = EliminationRecord {
            code: code.to_string(),
            scope,
            cutoff_score: plan.cutoff_score,
            team_ids: plan.eliminated.clone(),
        };
        self.store.write_elimination(&record).await.map_err(|e| {
            metrics::record_storage_failure("write_elimination");
            EliminationError::StorageFailure(e)
        })?;

        self.locks.forget_teams(code, &plan.eliminated);
        Ok(plan)
    }

    /// Runs the lock-and-read prefix of a mutating call under the engine
    /// timeout.
    async fn before_write<T, E>(
        &self,
        operation: &'static str,
        timed_out: impl FnOnce(Duration) -> E,
        prefix: impl Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let Some(limit) = self.timeout else {
            return prefix.await;
        };
        match tokio::time::timeout(limit, prefix).await {
            Ok(result) => result,
            Err(_) => {
                metrics::record_lock_timeout(operation);
                debug!(operation, timeout = ?limit, "gave up before writing");
                Err(timed_out(limit))
            }
        }
    }

    async fn lease(
        &self,
        operation: &'static str,
        code: &str,
        mode: LockMode,
    ) -> Result<StoreLease, StoreError> {
        self.store.lock(code, mode).await.inspect_err(|e| {
            if !matches!(e, StoreError::NotFound(_)) {
                metrics::record_storage_failure(operation);
            }
            debug!(hackathon = %code, operation, ?mode, error = %e, "store lease failed");
        })
    }

    async fn load_for(&self, operation: &'static str, code: &str) -> Result<Hackathon, StoreError> {
        self.store.load(code).await.inspect_err(|e| {
            metrics::record_storage_failure(operation);
            debug!(hackathon = %code, operation, error = %e, "snapshot read failed");
        })
    }
}

const fn scope_kind(scope: LeaderboardScope) -> &'static str {
    match scope {
        LeaderboardScope::Overall => "overall",
        LeaderboardScope::Phase(_) => "phase",
    }
}
