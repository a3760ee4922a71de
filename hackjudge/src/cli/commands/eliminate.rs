//! `hackjudge eliminate`: threshold elimination.

use crate::cli::args::EliminateArgs;
use crate::engine::Principal;
use crate::error::{EliminationError, HackJudgeError};
use crate::judging::{CutoffResult, LeaderboardScope};

use super::{Context, emit};

/// Eliminate the bottom `--count` teams (and everyone tied at the cutoff).
///
/// With `--dry-run` nothing is removed.
///
/// # Errors
///
/// Returns an [`EliminationError`] when the request is refused or the store
/// write fails.
pub async fn run(ctx: &Context, args: &EliminateArgs) -> Result<(), HackJudgeError> {
    let scope = match &args.phase {
        Some(selector) => LeaderboardScope::Phase(
            ctx.resolve_phase(&args.code, selector)
                .await
                .map_err(|e| match e {
                    HackJudgeError::Phase(p) => {
                        HackJudgeError::Elimination(EliminationError::PhaseNotFound(p))
                    }
                    other => other,
                })?,
        ),
        None => LeaderboardScope::Overall,
    };

    let result = if args.dry_run {
        ctx.call(ctx.engine.preview_elimination(&args.code, scope, args.count))
            .await?
    } else {
        let principal = Principal::new(args.principal.clone());
        ctx.engine
            .eliminate(&principal, &args.code, scope, args.count)
            .await?
    };

    let dry_run = args.dry_run;
    emit(args.format, ctx.quiet, &result, |r| render(r, dry_run))
}

fn render(result: &CutoffResult, dry_run: bool) -> String {
    let verb = if dry_run { "would eliminate" } else { "eliminated" };
    let ids: Vec<&str> = result.eliminated.iter().map(|id| id.as_str()).collect();
    format!(
        "{verb} {} team(s) scoring <= {} ({}): {}\n{} team(s) remaining",
        ids.len(),
        result.cutoff_score,
        result.scope,
        ids.join(", "),
        result.remaining
    )
}
