//! Configuration loader
//!
//! Loads two kinds of files:
//! 1. The optional engine configuration (`hackjudge.yaml`): store location,
//!    audit event sink and the caller-side timeout. Environment variables are
//!    expanded on the raw text before parsing.
//! 2. Hackathon snapshots (JSON or YAML) for the `validate` command, checked
//!    with the snapshot [`Validator`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use hackjudge_core::Hackathon;

use crate::config::validation::Validator;
use crate::error::ConfigError;

/// Default store directory when neither the CLI nor the config names one.
pub const DEFAULT_STORE_DIR: &str = "./data";

// ============================================================================
// Engine Configuration
// ============================================================================

/// Engine configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// File receiving JSONL audit events.
    #[serde(default)]
    pub events_file: Option<PathBuf>,

    /// Caller-side timeout for each engine call (e.g. `"5s"`, `"1m 30s"`).
    #[serde(default)]
    pub timeout: Option<String>,
}

/// Store section of [`EngineConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory of `<code>.json` snapshots.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Parses the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value is not a
    /// humantime duration.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout.as_deref().map(parse_timeout).transpose()
    }
}

/// Parses a humantime duration such as `"500ms"` or `"2m"`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything humantime rejects.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field: "timeout".to_string(),
        value: raw.to_string(),
        expected: format!("a duration such as '5s' ({e})"),
    })
}

// ============================================================================
// Limits
// ============================================================================

/// Size limits applied to hackathon snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLimits {
    /// Maximum number of phases.
    pub max_phases: usize,

    /// Maximum number of registered teams.
    pub max_teams: usize,

    /// Maximum number of submissions held by one team.
    pub max_submissions_per_team: usize,

    /// Maximum snapshot or configuration file size in bytes.
    pub max_file_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_phases: env_or("HACKJUDGE_MAX_PHASES", 64),
            max_teams: env_or("HACKJUDGE_MAX_TEAMS", 10_000),
            max_submissions_per_team: env_or("HACKJUDGE_MAX_SUBMISSIONS", 64),
            max_file_size: env_or("HACKJUDGE_MAX_FILE_SIZE", 32 * 1024 * 1024),
        }
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Warning raised while loading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// A loaded file plus the warnings collected on the way.
#[derive(Debug)]
pub struct LoadResult<T> {
    /// The parsed value.
    pub value: T,

    /// Non-fatal findings.
    pub warnings: Vec<LoadWarning>,
}

/// Loader for engine configuration and hackathon snapshot files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader enforcing `limits`.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Returns the limits this loader enforces.
    #[must_use]
    pub const fn limits(&self) -> &ConfigLimits {
        &self.limits
    }

    /// Loads an engine configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, an environment
    /// reference is unclosed or required-but-unset, or the YAML does not
    /// match [`EngineConfig`].
    pub fn load_engine_config(&self, path: &Path) -> Result<LoadResult<EngineConfig>, ConfigError> {
        let raw = self.read(path)?;
        let mut warnings = Vec::new();
        let expanded = expand_env(&raw, path, &mut warnings)?;

        if expanded.trim().is_empty() {
            return Ok(LoadResult {
                value: EngineConfig::default(),
                warnings,
            });
        }

        let config: EngineConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        config.timeout()?;
        Ok(LoadResult {
            value: config,
            warnings,
        })
    }

    /// Loads and validates a hackathon snapshot (JSON or YAML).
    ///
    /// Validation warnings are returned alongside the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for undecodable input and
    /// [`ConfigError::ValidationError`] listing every validation error.
    pub fn load_snapshot(&self, path: &Path) -> Result<LoadResult<Hackathon>, ConfigError> {
        let raw = self.read(path)?;
        let hackathon = parse_snapshot(&raw, path)?;

        let result = Validator::new().validate(&hackathon, &self.limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        Ok(LoadResult {
            value: hackathon,
            warnings,
        })
    }

    fn read(&self, path: &Path) -> Result<String, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > self.limits.max_file_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {} bytes", self.limits.max_file_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        Ok(raw.strip_prefix('\u{feff}').map_or_else(|| raw.clone(), str::to_owned))
    }
}

/// Decodes a snapshot; `.json` files go through `serde_json`, anything else
/// through `serde_yaml` (which also reads JSON).
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] with the parser's message.
pub fn parse_snapshot(raw: &str, path: &Path) -> Result<Hackathon, ConfigError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: Some(e.line()),
            message: e.to_string(),
        })
    } else {
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Environment Expansion
// ============================================================================

/// Expands environment references in raw configuration text.
///
/// Supports:
/// - `${VAR}` - value, or empty string with a warning if unset
/// - `${VAR:-default}` - default if unset
/// - `${VAR:?message}` - error if unset
/// - `$$` - literal `$`
fn expand_env(
    raw: &str,
    source: &Path,
    warnings: &mut Vec<LoadWarning>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            rest = after;
        } else if let Some(body_start) = tail.strip_prefix('{') {
            let end = body_start.find('}').ok_or_else(|| ConfigError::ParseError {
                path: source.to_path_buf(),
                line: None,
                message: format!("unclosed environment reference: ${{{body_start}"),
            })?;
            out.push_str(&resolve_reference(&body_start[..end], source, warnings)?);
            rest = &body_start[end + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    Ok(out)
}

fn resolve_reference(
    reference: &str,
    source: &Path,
    warnings: &mut Vec<LoadWarning>,
) -> Result<String, ConfigError> {
    let (name, fallback) = reference
        .split_once(":-")
        .map_or((reference, None), |(n, d)| (n, Some(Fallback::Default(d))));
    let (name, fallback) = match fallback {
        Some(f) => (name, Some(f)),
        None => reference
            .split_once(":?")
            .map_or((name, None), |(n, m)| (n, Some(Fallback::Required(m)))),
    };

    if let Ok(value) = std::env::var(name) {
        return Ok(value);
    }

    match fallback {
        Some(Fallback::Default(default)) => Ok(default.to_string()),
        Some(Fallback::Required(message)) => Err(ConfigError::EnvVarNotSet {
            var: name.to_string(),
            location: message.to_string(),
        }),
        None => {
            warnings.push(LoadWarning {
                message: format!("environment variable '{name}' is not set, using empty string"),
                location: Some(source.display().to_string()),
            });
            Ok(String::new())
        }
    }
}

enum Fallback<'a> {
    Default(&'a str),
    Required(&'a str),
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn expand(raw: &str) -> (Result<String, ConfigError>, Vec<LoadWarning>) {
        let mut warnings = Vec::new();
        let out = expand_env(raw, Path::new("hackjudge.yaml"), &mut warnings);
        (out, warnings)
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_expand_set_variable() {
        let (out, warnings) = expand("path: ${PATH}");
        let out = out.unwrap();
        assert!(!out.contains("${PATH}"));
        assert!(out.len() > "path: ".len());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_expand_default() {
        let (out, _) = expand("dir: ${HACKJUDGE_TEST_UNSET_DIR_91A:-/srv/hack}");
        assert_eq!(out.unwrap(), "dir: /srv/hack");
    }

    #[test]
    fn test_expand_required_missing() {
        let (out, _) = expand("dir: ${HACKJUDGE_TEST_UNSET_DIR_91B:?store dir}");
        match out {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "HACKJUDGE_TEST_UNSET_DIR_91B");
                assert_eq!(location, "store dir");
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn test_expand_missing_warns() {
        let (out, warnings) = expand("x: ${HACKJUDGE_TEST_UNSET_DIR_91C}!");
        assert_eq!(out.unwrap(), "x: !");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("HACKJUDGE_TEST_UNSET_DIR_91C"));
    }

    #[test]
    fn test_expand_escapes_and_lone_dollar() {
        let (out, _) = expand("price: $$5 and $x");
        assert_eq!(out.unwrap(), "price: $5 and $x");
    }

    #[test]
    fn test_expand_unclosed() {
        let (out, _) = expand("x: ${OOPS");
        assert!(matches!(out, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_load_engine_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "hackjudge.yaml",
            "store:\n  dir: ${HACKJUDGE_TEST_UNSET_DIR_91D:-/tmp/hj}\nevents_file: audit.jsonl\ntimeout: 3s\n",
        );
        let loaded = ConfigLoader::default().load_engine_config(&path).unwrap();
        assert_eq!(loaded.value.store.dir, Some(PathBuf::from("/tmp/hj")));
        assert_eq!(loaded.value.events_file, Some(PathBuf::from("audit.jsonl")));
        assert_eq!(loaded.value.timeout().unwrap(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_load_engine_config_rejects_unknown_keys_and_bad_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let unknown = write_temp(&dir, "a.yaml", "stor:\n  dir: x\n");
        assert!(matches!(
            ConfigLoader::default().load_engine_config(&unknown),
            Err(ConfigError::ParseError { .. })
        ));
        let bad = write_temp(&dir, "b.yaml", "timeout: whenever\n");
        assert!(matches!(
            ConfigLoader::default().load_engine_config(&bad),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_engine_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "empty.yaml", "\n");
        let loaded = ConfigLoader::default().load_engine_config(&path).unwrap();
        assert_eq!(loaded.value, EngineConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::default()
            .load_engine_config(Path::new("/definitely/not/here.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_snapshot_yaml_and_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_temp(
            &dir,
            "hx.yaml",
            "code: HX\nphases:\n  - name: one\n    startTime: 2024-01-01T00:00:00Z\n    endTime: 2024-01-02T00:00:00Z\nregistrations: []\n",
        );
        let loaded = ConfigLoader::default().load_snapshot(&good).unwrap();
        assert_eq!(loaded.value.code, "HX");

        let bad = write_temp(
            &dir,
            "bad.json",
            r#"{"code": "HX", "phases": [{"name": "one", "startTime": "2024-01-02T00:00:00Z", "endTime": "2024-01-01T00:00:00Z"}]}"#,
        );
        match ConfigLoader::default().load_snapshot(&bad) {
            Err(ConfigError::ValidationError { errors, .. }) => {
                assert_eq!(errors[0].path, "phases[0].endTime");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_rejects_out_of_range_score() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "hx.json",
            r#"{"code": "HX", "registrations": [{"teamId": "a", "teamName": "A", "leader": "x", "submissions": [{"phaseIndex": 0, "score": 140}]}]}"#,
        );
        assert!(matches!(
            ConfigLoader::default().load_snapshot(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
