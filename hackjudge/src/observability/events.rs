//! Audit event stream.
//!
//! Every successful score write and elimination, and every rejected
//! elimination, is emitted as one JSON line carrying a monotonically
//! increasing sequence number and the acting principal.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use hackjudge_core::TeamId;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// An audited judging action.
///
/// Serialized with a `"type"` tag so consumers can dispatch on the kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A score was persisted.
    ScoreRecorded {
        /// When the write completed.
        timestamp: DateTime<Utc>,
        /// Acting principal.
        principal: String,
        /// Hackathon code.
        hackathon: String,
        /// Scored team.
        team_id: TeamId,
        /// Scored phase.
        phase_index: usize,
        /// New score.
        score: u8,
        /// Score it replaced, if any.
        previous: Option<u8>,
    },

    /// An elimination removed registrations.
    TeamsEliminated {
        /// When the write completed.
        timestamp: DateTime<Utc>,
        /// Acting principal.
        principal: String,
        /// Hackathon code.
        hackathon: String,
        /// `"overall"` or `"phase N"`.
        scope: String,
        /// Count the caller asked for.
        requested: i64,
        /// Cutoff score.
        cutoff_score: u32,
        /// Removed teams.
        eliminated: Vec<TeamId>,
        /// Registrations left.
        remaining: usize,
    },

    /// An elimination was refused before anything was written.
    EliminationRejected {
        /// When the request was refused.
        timestamp: DateTime<Utc>,
        /// Acting principal.
        principal: String,
        /// Hackathon code.
        hackathon: String,
        /// Count the caller asked for.
        requested: i64,
        /// Error message.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization or I/O failures are dropped; auditing never fails a
/// judging call.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter appending to the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::noop()
    }
}
