//! `hackjudge leaderboard`: ranked views.

use std::fmt::Write as _;

use crate::cli::args::LeaderboardArgs;
use crate::error::HackJudgeError;
use crate::judging::{Leaderboard, LeaderboardScope};

use super::{Context, emit};

/// Print the overall leaderboard, or one phase's with `--phase`.
///
/// # Errors
///
/// Returns a store error or [`PhaseNotFound`](crate::error::PhaseNotFound).
pub async fn run(ctx: &Context, args: &LeaderboardArgs) -> Result<(), HackJudgeError> {
    let scope = match &args.phase {
        Some(selector) => LeaderboardScope::Phase(ctx.resolve_phase(&args.code, selector).await?),
        None => LeaderboardScope::Overall,
    };
    let board = ctx.call(ctx.engine.leaderboard(&args.code, scope)).await?;
    let code = args.code.as_str();
    emit(args.format, ctx.quiet, &board, |b| render(code, b))
}

/// Renders a leaderboard as a fixed-width table.
#[must_use]
pub fn render(code: &str, board: &Leaderboard) -> String {
    let mut out = format!("{code} {} leaderboard: {} team(s)", board.scope, board.len());
    if board.pending_grades > 0 {
        let _ = write!(out, ", {} awaiting a score", board.pending_grades);
    }
    if board.is_empty() {
        return out;
    }
    let last = match board.scope {
        LeaderboardScope::Overall => "SUBMITTED",
        LeaderboardScope::Phase(_) => "STATUS",
    };
    let _ = write!(
        out,
        "\n{:>4}  {:<16} {:<24} {:>5}  {:>7}  {last}",
        "RANK", "TEAM", "NAME", "SCORE", "MEMBERS"
    );
    for entry in &board.entries {
        let state = match (entry.judging, entry.has_submission) {
            (Some(status), _) => status.to_string(),
            (None, true) => "yes".to_string(),
            (None, false) => "no".to_string(),
        };
        let _ = write!(
            out,
            "\n{:>4}  {:<16} {:<24} {:>5}  {:>7}  {state}",
            entry.rank,
            entry.team_id.as_str(),
            entry.team_name,
            entry.score,
            entry.member_count,
        );
    }
    out
}
