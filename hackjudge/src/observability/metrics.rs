//! Metrics for judging operations.
//!
//! Counters go through the `metrics` facade and are no-ops unless the host
//! process installs a recorder.

use metrics::{counter, describe_counter};

/// Maximum length of a hackathon code used as a label.
const MAX_CODE_LABEL_LEN: usize = 64;

/// Registers metric descriptions with the global recorder.
pub fn describe_metrics() {
    describe_counter!(
        "hackjudge_scores_recorded_total",
        "Scores written, by hackathon"
    );
    describe_counter!(
        "hackjudge_eliminations_total",
        "Elimination calls applied, by hackathon and scope kind"
    );
    describe_counter!(
        "hackjudge_teams_eliminated_total",
        "Registrations removed by eliminations"
    );
    describe_counter!(
        "hackjudge_storage_failures_total",
        "Store reads or writes that failed, by operation"
    );
    describe_counter!(
        "hackjudge_lock_timeouts_total",
        "Mutating calls that gave up waiting for the lock or snapshot read"
    );
}

/// Records a persisted score.
pub fn record_score(code: &str, created: bool) {
    counter!(
        "hackjudge_scores_recorded_total",
        "hackathon" => sanitize_code_label(code),
        "created" => if created { "true" } else { "false" }
    )
    .increment(1);
}

/// Records an applied elimination and the number of teams it removed.
pub fn record_elimination(code: &str, scope_kind: &'static str, removed: usize) {
    let code = sanitize_code_label(code);
    counter!(
        "hackjudge_eliminations_total",
        "hackathon" => code.clone(),
        "scope" => scope_kind
    )
    .increment(1);
    counter!("hackjudge_teams_eliminated_total", "hackathon" => code)
        .increment(u64::try_from(removed).unwrap_or(u64::MAX));
}

/// Records a failed store call.
pub fn record_storage_failure(operation: &'static str) {
    counter!("hackjudge_storage_failures_total", "operation" => operation).increment(1);
}

/// Records a mutating call abandoned before its write.
pub fn record_lock_timeout(operation: &'static str) {
    counter!("hackjudge_lock_timeouts_total", "operation" => operation).increment(1);
}

/// Sanitizes a hackathon code for use as a label.
///
/// Codes come from stored data, so they are truncated and restricted to
/// `[A-Za-z0-9_-]`.
fn sanitize_code_label(code: &str) -> String {
    code.chars()
        .take(MAX_CODE_LABEL_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_code_label_replaces_and_truncates() {
        assert_eq!(sanitize_code_label("SPRING-24"), "SPRING-24");
        assert_eq!(sanitize_code_label("a b/c"), "a_b_c");
        assert_eq!(sanitize_code_label(&"x".repeat(500)).len(), MAX_CODE_LABEL_LEN);
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        describe_metrics();
        record_score("HX", true);
        record_elimination("HX", "overall", 3);
        record_storage_failure("write_score");
        record_lock_timeout("eliminate");
    }
}
