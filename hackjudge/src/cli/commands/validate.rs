//! `hackjudge validate`: check snapshot files without touching a store.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLimits, ConfigLoader};
use crate::error::{ConfigError, HackJudgeError};

/// Outcome for one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

#[derive(Debug, Serialize)]
struct Finding {
    path: String,
    message: String,
}

/// Validate every file and report all findings.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationFailed`] when any file has errors (or,
/// with `--strict`, warnings).
pub fn run(args: &ValidateArgs) -> Result<(), HackJudgeError> {
    let loader = ConfigLoader::new(ConfigLimits::default());
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check(&loader, path, args.strict))
        .collect();

    let failed = reports.iter().filter(|r| !r.valid).count();

    match args.format {
        OutputFormat::Json => super::print_json(&serde_json::json!({
            "files": reports,
            "summary": {
                "total": reports.len(),
                "valid": reports.len() - failed,
                "failed": failed,
            },
        }))?,
        OutputFormat::Human => {
            for report in &reports {
                print_human(report);
            }
        }
    }

    if failed > 0 {
        return Err(ConfigError::ValidationFailed { count: failed }.into());
    }
    Ok(())
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    tracing::info!(file = %path.display(), "validating snapshot");
    let file = path.display().to_string();

    match loader.load_snapshot(path) {
        Ok(loaded) => {
            let warnings: Vec<Finding> = loaded
                .warnings
                .into_iter()
                .map(|w| Finding {
                    path: w.location.unwrap_or_default(),
                    message: w.message,
                })
                .collect();
            FileReport {
                file,
                valid: !(strict && !warnings.is_empty()),
                errors: Vec::new(),
                warnings,
            }
        }
        Err(ConfigError::ValidationError { errors, .. }) => FileReport {
            file,
            valid: false,
            errors: errors
                .into_iter()
                .map(|issue| Finding {
                    path: issue.path,
                    message: issue.message,
                })
                .collect(),
            warnings: Vec::new(),
        },
        Err(other) => FileReport {
            file,
            valid: false,
            errors: vec![Finding {
                path: String::new(),
                message: other.to_string(),
            }],
            warnings: Vec::new(),
        },
    }
}

fn print_human(report: &FileReport) {
    let status = if report.valid { "ok" } else { "FAILED" };
    println!("{status}: {}", report.file);
    for finding in &report.errors {
        print_finding("error", finding);
    }
    for finding in &report.warnings {
        print_finding("warning", finding);
    }
}

fn print_finding(level: &str, finding: &Finding) {
    if finding.path.is_empty() {
        println!("  {level}: {}", finding.message);
    } else {
        println!("  {level}: {} at {}", finding.message, finding.path);
    }
}
