//! `hackjudge score`: record one judge's score.

use hackjudge_core::TeamId;

use crate::cli::args::ScoreArgs;
use crate::engine::Principal;
use crate::error::{HackJudgeError, ScoreError};
use crate::judging::ScoreReceipt;

use super::{Context, emit};

/// Record `--score` for `--team` in `--phase`.
///
/// # Errors
///
/// Returns a [`ScoreError`] for a bad score, phase or team, or a failed
/// store write.
pub async fn run(ctx: &Context, args: &ScoreArgs) -> Result<(), HackJudgeError> {
    let phase_index = ctx
        .resolve_phase(&args.code, &args.phase)
        .await
        .map_err(|e| match e {
            HackJudgeError::Phase(p) => HackJudgeError::Score(ScoreError::PhaseNotFound(p)),
            other => other,
        })?;

    let principal = Principal::new(args.principal.clone());
    let team_id = TeamId::new(args.team.clone());
    let receipt = ctx
        .engine
        .record_score(&principal, &args.code, &team_id, phase_index, &args.score)
        .await?;

    emit(args.format, ctx.quiet, &receipt, render)
}

fn render(receipt: &ScoreReceipt) -> String {
    let was = match (receipt.previous, receipt.created) {
        (Some(prev), _) => format!(" (was {prev})"),
        (None, true) => " (no submission on file)".to_string(),
        (None, false) => String::new(),
    };
    format!(
        "recorded {} for team {} in phase {} of {}{was}",
        receipt.score, receipt.team_id, receipt.phase_index, receipt.hackathon
    )
}
