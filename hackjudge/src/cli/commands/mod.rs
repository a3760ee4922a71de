//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler and builds
//! the engine the judging commands share.

pub mod completions;
pub mod eliminate;
pub mod leaderboard;
pub mod list;
pub mod phases;
pub mod score;
pub mod validate;
pub mod version;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::{ConfigLimits, ConfigLoader, DEFAULT_STORE_DIR, EngineConfig};
use crate::engine::JudgingEngine;
use crate::error::HackJudgeError;
use crate::observability::EventEmitter;
use crate::phase::{PhaseSelector, resolve_phase};
use crate::store::FileStore;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the dispatched
/// command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), HackJudgeError> {
    match &cli.command {
        Commands::Validate(args) => validate::run(args),
        Commands::Completions(args) => {
            completions::run(args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(args);
            Ok(())
        }
        Commands::List(args) => list::run(&Context::from_cli(&cli)?, args).await,
        Commands::Phases(args) => phases::run(&Context::from_cli(&cli)?, args).await,
        Commands::Score(args) => score::run(&Context::from_cli(&cli)?, args).await,
        Commands::Leaderboard(args) => leaderboard::run(&Context::from_cli(&cli)?, args).await,
        Commands::Eliminate(args) => eliminate::run(&Context::from_cli(&cli)?, args).await,
    }
}

/// Shared state for the judging commands.
#[derive(Debug)]
pub struct Context {
    /// Engine over the configured store, bounded by the same timeout.
    pub engine: JudgingEngine,
    /// Caller-side limit on each read.
    pub timeout: Option<Duration>,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Context {
    /// Builds the engine from CLI flags, falling back to the config file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config file is invalid, or an
    /// I/O error if the events file cannot be opened.
    pub fn from_cli(cli: &Cli) -> Result<Self, HackJudgeError> {
        let config = match &cli.config {
            Some(path) => load_config(path)?,
            None => EngineConfig::default(),
        };

        let store_dir = cli
            .store
            .clone()
            .or_else(|| config.store.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));

        let events = match cli.events_file.as_ref().or(config.events_file.as_ref()) {
            Some(path) if path.as_os_str() == "-" => EventEmitter::stderr(),
            Some(path) => EventEmitter::from_file(path)?,
            None => EventEmitter::noop(),
        };

        let timeout = match cli.timeout {
            Some(t) => Some(t),
            None => config.timeout()?,
        };

        tracing::debug!(store = %store_dir.display(), ?timeout, "judging context ready");

        let store = FileStore::with_limits(store_dir, ConfigLimits::default());
        Ok(Self {
            engine: JudgingEngine::new(Arc::new(store))
                .with_events(Arc::new(events))
                .with_timeout(timeout),
            timeout,
            quiet: cli.quiet,
        })
    }

    /// Runs one read-only engine call under the configured timeout.
    ///
    /// Mutating calls go to the engine directly: it applies the timeout to
    /// their lock-and-read prefix only, never to the write.
    ///
    /// # Errors
    ///
    /// Returns [`HackJudgeError::Timeout`] if the call does not finish in
    /// time, or the call's own error.
    pub async fn call<T, E>(
        &self,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, HackJudgeError>
    where
        E: Into<HackJudgeError>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| HackJudgeError::Timeout(humantime::format_duration(limit).to_string()))?
                .map_err(Into::into),
            None => fut.await.map_err(Into::into),
        }
    }

    /// Resolves a phase selector; names require a snapshot read.
    ///
    /// # Errors
    ///
    /// Returns the store error or a [`PhaseNotFound`](crate::error::PhaseNotFound).
    pub async fn resolve_phase(
        &self,
        code: &str,
        selector: &PhaseSelector,
    ) -> Result<usize, HackJudgeError> {
        if let PhaseSelector::Index(index) = selector {
            return Ok(*index);
        }
        let hackathon = self.call(self.engine.hackathon(code)).await?;
        Ok(resolve_phase(&hackathon, selector)?)
    }
}

fn load_config(path: &Path) -> Result<EngineConfig, HackJudgeError> {
    let loaded = ConfigLoader::default().load_engine_config(path)?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(loaded.value)
}

/// Prints `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns [`HackJudgeError::Json`] if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), HackJudgeError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints human or JSON output unless `quiet` suppresses the human form.
///
/// JSON is always printed, since a caller asking for it is parsing stdout.
///
/// # Errors
///
/// Returns [`HackJudgeError::Json`] if serialization fails.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    quiet: bool,
    value: &T,
    human: impl FnOnce(&T) -> String,
) -> Result<(), HackJudgeError> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Human => {
            if !quiet {
                println!("{}", human(value));
            }
            Ok(())
        }
    }
}
