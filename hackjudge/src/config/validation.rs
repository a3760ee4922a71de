//! Snapshot validation
//!
//! Checks a hackathon aggregate for the structural invariants the engine
//! relies on: well-formed phase windows, unique names and ids, at most one
//! submission per phase, and phase indices inside the phase sequence.
//!
//! Validation collects ALL issues (doesn't stop at first) so a broken
//! snapshot can be fixed in one pass.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use hackjudge_core::{Hackathon, Registration};

use crate::config::loader::ConfigLimits;
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of snapshot validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (snapshot unusable).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Hackathon snapshot validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `hackathon` as of the current instant.
    pub fn validate(&mut self, hackathon: &Hackathon, limits: &ConfigLimits) -> ValidationResult {
        self.validate_at(hackathon, limits, Utc::now())
    }

    /// Validates `hackathon`, evaluating time-dependent warnings at `now`.
    pub fn validate_at(
        &mut self,
        hackathon: &Hackathon,
        limits: &ConfigLimits,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        if hackathon.code.trim().is_empty() {
            self.error("code", "hackathon code is empty");
        }

        self.validate_limits(hackathon, limits);
        self.validate_phases(hackathon);
        self.validate_registrations(hackathon, limits, now);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn validate_limits(&mut self, hackathon: &Hackathon, limits: &ConfigLimits) {
        if hackathon.phases.len() > limits.max_phases {
            self.error(
                "phases",
                format!(
                    "{} phases exceeds limit of {}",
                    hackathon.phases.len(),
                    limits.max_phases
                ),
            );
        }
        if hackathon.registrations.len() > limits.max_teams {
            self.error(
                "registrations",
                format!(
                    "{} teams exceeds limit of {}",
                    hackathon.registrations.len(),
                    limits.max_teams
                ),
            );
        }
    }

    fn validate_phases(&mut self, hackathon: &Hackathon) {
        let mut names = HashSet::new();
        for (i, phase) in hackathon.phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                self.error(format!("phases[{i}].name"), "phase name is empty");
            } else if !names.insert(phase.name.as_str()) {
                self.error(
                    format!("phases[{i}].name"),
                    format!("duplicate phase name '{}'", phase.name),
                );
            }

            if phase.start_time >= phase.end_time {
                self.error(
                    format!("phases[{i}].endTime"),
                    "phase must end after it starts",
                );
            }
        }

        for (i, pair) in hackathon.phases.windows(2).enumerate() {
            if pair[1].start_time <= pair[0].end_time && pair[0].start_time < pair[0].end_time {
                self.warning(
                    format!("phases[{}].startTime", i + 1),
                    format!("phase overlaps '{}'", pair[0].name),
                );
            }
        }
    }

    fn validate_registrations(
        &mut self,
        hackathon: &Hackathon,
        limits: &ConfigLimits,
        now: DateTime<Utc>,
    ) {
        let mut team_ids = HashSet::new();
        for (i, team) in hackathon.registrations.iter().enumerate() {
            let base = format!("registrations[{i}]");

            if team.team_id.as_str().trim().is_empty() {
                self.error(format!("{base}.teamId"), "team id is empty");
            } else if !team_ids.insert(&team.team_id) {
                self.error(
                    format!("{base}.teamId"),
                    format!("duplicate team id '{}'", team.team_id),
                );
            }

            if team.team_name.trim().is_empty() {
                self.warning(format!("{base}.teamName"), "team name is empty");
            }

            if team.submissions.len() > limits.max_submissions_per_team {
                self.error(
                    format!("{base}.submissions"),
                    format!(
                        "{} submissions exceeds limit of {}",
                        team.submissions.len(),
                        limits.max_submissions_per_team
                    ),
                );
            }

            self.validate_submissions(hackathon, team, &base, now);
        }
    }

    fn validate_submissions(
        &mut self,
        hackathon: &Hackathon,
        team: &Registration,
        base: &str,
        now: DateTime<Utc>,
    ) {
        let mut seen = HashSet::new();
        for (j, submission) in team.submissions.iter().enumerate() {
            let path = format!("{base}.submissions[{j}].phaseIndex");

            if !seen.insert(submission.phase_index) {
                self.error(
                    &path,
                    format!(
                        "more than one submission for phase {}",
                        submission.phase_index
                    ),
                );
            }

            match hackathon.phase(submission.phase_index) {
                None => self.error(
                    &path,
                    format!(
                        "phase index {} out of range (hackathon has {} phases)",
                        submission.phase_index,
                        hackathon.phases.len()
                    ),
                ),
                Some(phase) if submission.score.is_some() && now < phase.start_time => {
                    self.warning(
                        format!("{base}.submissions[{j}].score"),
                        format!("scored before phase '{}' started", phase.name),
                    );
                }
                Some(_) => {}
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}
