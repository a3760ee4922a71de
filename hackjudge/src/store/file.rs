//! JSON file store.
//!
//! One `<code>.json` snapshot per hackathon in a directory. Writes re-read
//! the file, apply the change, validate the result, write it to a uniquely
//! named temporary sibling and rename it over the original. A failure at any
//! step leaves the previous snapshot in place.
//!
//! Several processes may share a directory. Two advisory lock files sit next
//! to each snapshot:
//!
//! - `<code>.lock` backs [`HackathonStore::lock`]: shared for scoring,
//!   exclusive for elimination.
//! - `<code>.write.lock` is held exclusively across every read-modify-write.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use hackjudge_core::Hackathon;

use crate::config::{ConfigLimits, Validator};
use crate::error::StoreError;
use crate::judging::ScoreOutcome;

use super::{
    EliminationRecord, HackathonStore, LockMode, Result, ScoreUpdate, StoreLease,
    apply_elimination, apply_score,
};

const SNAPSHOT_EXT: &str = "json";
const LEASE_SUFFIX: &str = "lock";
const WRITE_SUFFIX: &str = "write.lock";

/// Directory-backed [`HackathonStore`].
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    limits: ConfigLimits,
    file_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileStore {
    /// Creates a store over `dir` with default limits.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_limits(dir, ConfigLimits::default())
    }

    /// Creates a store over `dir` enforcing `limits` on load and write.
    #[must_use]
    pub fn with_limits(dir: impl Into<PathBuf>, limits: ConfigLimits) -> Self {
        Self {
            dir: dir.into(),
            limits,
            file_locks: DashMap::new(),
        }
    }

    /// Path of the snapshot for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for codes that cannot name a file in
    /// the store directory.
    pub fn snapshot_path(&self, code: &str) -> Result<PathBuf> {
        self.sibling(code, SNAPSHOT_EXT)
    }

    fn sibling(&self, code: &str, suffix: &str) -> Result<PathBuf> {
        let usable = !code.is_empty()
            && code != "."
            && code != ".."
            && !code.contains(['/', '\\', '\0']);
        if !usable {
            return Err(StoreError::NotFound(code.to_string()));
        }
        Ok(self.dir.join(format!("{code}.{suffix}")))
    }

    /// Writes `hackathon` as a new or replacement snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the aggregate fails validation and
    /// [`StoreError::Io`] if the file cannot be written.
    pub async fn put(&self, hackathon: &Hackathon) -> Result<()> {
        let path = self.snapshot_path(&hackathon.code)?;
        let lock = self.file_lock(&hackathon.code);
        let _guard = lock.lock().await;
        self.check(&hackathon.code, hackathon)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let write_lock = self.sibling(&hackathon.code, WRITE_SUFFIX)?;
        let _write = lock_file(write_lock, LockMode::Exclusive).await?;
        self.replace(&path, hackathon).await
    }

    fn file_lock(&self, code: &str) -> Arc<Mutex<()>> {
        self.file_locks
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn check(&self, code: &str, hackathon: &Hackathon) -> Result<()> {
        let result = Validator::new().validate(hackathon, &self.limits);
        if let Some(first) = result.errors.first() {
            return Err(StoreError::Corrupt {
                code: code.to_string(),
                message: format!("{} validation error(s), first: {first}", result.errors.len()),
            });
        }
        for warning in &result.warnings {
            tracing::warn!(hackathon = %code, %warning, "snapshot warning");
        }
        Ok(())
    }

    async fn read(&self, code: &str) -> Result<Hackathon> {
        let path = self.snapshot_path(code)?;
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(code.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        if raw.len() > self.limits.max_file_size {
            return Err(StoreError::Corrupt {
                code: code.to_string(),
                message: format!(
                    "snapshot is {} bytes, limit is {}",
                    raw.len(),
                    self.limits.max_file_size
                ),
            });
        }

        let hackathon: Hackathon =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Corrupt {
                code: code.to_string(),
                message: e.to_string(),
            })?;

        if hackathon.code != code {
            return Err(StoreError::Corrupt {
                code: code.to_string(),
                message: format!("file holds hackathon '{}'", hackathon.code),
            });
        }

        self.check(code, &hackathon)?;
        Ok(hackathon)
    }

    async fn replace(&self, path: &Path, hackathon: &Hackathon) -> Result<()> {
        let body = serde_json::to_vec_pretty(hackathon).map_err(|e| StoreError::Corrupt {
            code: hackathon.code.clone(),
            message: e.to_string(),
        })?;

        let dir = self.dir.clone();
        let path = path.to_path_buf();
        // The temp file removes itself if any step fails.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&body)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(blocking_failed)?
    }

    async fn modify<T>(
        &self,
        code: &str,
        apply: impl FnOnce(&mut Hackathon) -> Result<T> + Send,
    ) -> Result<T> {
        let path = self.snapshot_path(code)?;
        let lock = self.file_lock(code);
        let _guard = lock.lock().await;
        let _write = lock_file(self.sibling(code, WRITE_SUFFIX)?, LockMode::Exclusive).await?;

        let mut hackathon = self.read(code).await?;
        let out = apply(&mut hackathon)?;
        self.check(code, &hackathon)?;
        self.replace(&path, &hackathon).await?;
        Ok(out)
    }
}

/// Opens (creating if needed) and locks `path`; the lock lives as long as
/// the returned handle.
async fn lock_file(path: PathBuf, mode: LockMode) -> Result<File> {
    tokio::task::spawn_blocking(move || -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        match mode {
            LockMode::Shared => fs4::fs_std::FileExt::lock_shared(&file)?,
            LockMode::Exclusive => fs4::fs_std::FileExt::lock_exclusive(&file)?,
        }
        Ok(file)
    })
    .await
    .map_err(blocking_failed)?
}

fn blocking_failed(e: tokio::task::JoinError) -> StoreError {
    StoreError::Unavailable(format!("blocking file task failed: {e}"))
}

#[async_trait::async_trait]
impl HackathonStore for FileStore {
    async fn lock(&self, code: &str, mode: LockMode) -> Result<StoreLease> {
        let snapshot = self.snapshot_path(code)?;
        if !tokio::fs::try_exists(&snapshot).await? {
            return Err(StoreError::NotFound(code.to_string()));
        }
        let file = lock_file(self.sibling(code, LEASE_SUFFIX)?, mode).await?;
        tracing::trace!(hackathon = %code, ?mode, "lease acquired");
        Ok(StoreLease::holding(file))
    }

    async fn load(&self, code: &str) -> Result<Hackathon> {
        self.read(code).await
    }

    async fn write_score(&self, update: &ScoreUpdate) -> Result<ScoreOutcome> {
        self.modify(&update.code, |h| apply_score(h, update)).await
    }

    async fn write_elimination(&self, record: &EliminationRecord) -> Result<usize> {
        self.modify(&record.code, |h| apply_elimination(h, record))
            .await
    }

    async fn list_codes(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut codes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                codes.push(stem.to_string());
            }
        }
        codes.sort();
        Ok(codes)
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
