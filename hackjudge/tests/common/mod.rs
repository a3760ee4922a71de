//! Shared integration-test helpers: fixtures, engines over in-memory and
//! file stores, stores that fail, stall or crawl on demand, and a CLI runner.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, Semaphore};

use hackjudge::engine::{JudgingEngine, Principal};
use hackjudge::error::StoreError;
use hackjudge::judging::ScoreOutcome;
use hackjudge::observability::EventEmitter;
use hackjudge::store::{
    EliminationRecord, HackathonStore, LockMode, MemoryStore, ScoreUpdate, StoreLease,
};
use hackjudge_core::Hackathon;

/// Code of the main fixture hackathon.
pub const SPRING: &str = "SPRING";

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Loads the five-team fixture (overall totals 90, 80, 80, 60, 10).
pub fn spring() -> Hackathon {
    let raw = std::fs::read_to_string(fixture_path("spring-hack.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// An admin principal from the fixture.
pub fn admin() -> Principal {
    Principal::new("ops@spring-hack.dev")
}

/// An engine over a memory store seeded with the fixture.
pub fn memory_engine() -> JudgingEngine {
    JudgingEngine::new(Arc::new(MemoryStore::with_hackathons([spring()])))
}

/// A temp directory holding `SPRING.json`.
pub fn store_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(
        fixture_path("spring-hack.json"),
        dir.path().join(format!("{SPRING}.json")),
    )
    .unwrap();
    dir
}

/// Team ids currently registered, in stored order.
pub fn team_ids(hackathon: &Hackathon) -> Vec<String> {
    hackathon
        .registrations
        .iter()
        .map(|r| r.team_id.to_string())
        .collect()
}

// ============================================================================
// Event capture
// ============================================================================

/// In-memory writer shared between an emitter and the test.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<u8>>>);

impl CapturedEvents {
    /// An emitter writing into this buffer.
    pub fn emitter(&self) -> Arc<EventEmitter> {
        Arc::new(EventEmitter::new(Box::new(self.clone())))
    }

    /// Parsed JSONL lines written so far.
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}

impl Write for CapturedEvents {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Test stores
// ============================================================================

/// Memory store whose reads or writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_loads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn seeded() -> Self {
        Self {
            inner: MemoryStore::with_hackathons([spring()]),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, on: bool) {
        self.fail_loads.store(on, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl HackathonStore for FailingStore {
    async fn lock(&self, code: &str, mode: LockMode) -> Result<StoreLease, StoreError> {
        self.inner.lock(code, mode).await
    }

    async fn load(&self, code: &str) -> Result<Hackathon, StoreError> {
        self.check(&self.fail_loads)?;
        self.inner.load(code).await
    }

    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.write_score(update).await
    }

    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize, StoreError> {
        self.check(&self.fail_writes)?;
        self.inner.write_elimination(record).await
    }

    async fn list_codes(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_codes().await
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Store whose score writes stall until released; memory-backed unless
/// built with [`GatedStore::over`].
#[derive(Debug)]
pub struct GatedStore<S = MemoryStore> {
    pub inner: S,
    /// Signalled when a score write reaches the gate
    pub entered: Notify,
    gate: Semaphore,
}

impl GatedStore<MemoryStore> {
    pub fn seeded() -> Self {
        Self::over(MemoryStore::with_hackathons([spring()]))
    }
}

impl<S> GatedStore<S> {
    pub fn over(inner: S) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    /// Lets `n` stalled score writes through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait::async_trait]
impl<S: HackathonStore> HackathonStore for GatedStore<S> {
    async fn lock(&self, code: &str, mode: LockMode) -> Result<StoreLease, StoreError> {
        self.inner.lock(code, mode).await
    }

    async fn load(&self, code: &str) -> Result<Hackathon, StoreError> {
        self.inner.load(code).await
    }

    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome, StoreError> {
        self.entered.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        permit.forget();
        self.inner.write_score(update).await
    }

    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize, StoreError> {
        self.inner.write_elimination(record).await
    }

    async fn list_codes(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_codes().await
    }

    fn backend(&self) -> &'static str {
        "gated"
    }
}

/// Memory store whose writes take `delay` before they land.
#[derive(Debug)]
pub struct SlowStore {
    pub inner: MemoryStore,
    pub delay: Duration,
}

impl SlowStore {
    pub fn seeded(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::with_hackathons([spring()]),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl HackathonStore for SlowStore {
    async fn load(&self, code: &str) -> Result<Hackathon, StoreError> {
        self.inner.load(code).await
    }

    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.write_score(update).await
    }

    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.write_elimination(record).await
    }

    async fn list_codes(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_codes().await
    }

    fn backend(&self) -> &'static str {
        "slow"
    }
}

// ============================================================================
// CLI
// ============================================================================

/// Runs the `hackjudge` binary against `store` with the given arguments.
pub fn run_cli(store: &Path, args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_hackjudge"))
        .arg("--store")
        .arg(store)
        .args(args)
        .env_remove("HACKJUDGE_CONFIG")
        .env_remove("HACKJUDGE_PRINCIPAL")
        .env_remove("HACKJUDGE_EVENTS_FILE")
        .env_remove("HACKJUDGE_LOG_LEVEL")
        .output()
        .expect("failed to run hackjudge")
}

/// Parses the stdout of a `--format json` invocation.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"))
}
