//! `hackjudge phases`: the phase timeline of one hackathon.

use std::fmt::Write as _;

use chrono::Utc;

use crate::cli::args::PhasesArgs;
use crate::engine::PhaseTimeline;
use crate::error::HackJudgeError;

use super::{Context, emit};

/// Print every phase with its status at `--at` (default: now).
///
/// # Errors
///
/// Returns a store error if the hackathon cannot be read.
pub async fn run(ctx: &Context, args: &PhasesArgs) -> Result<(), HackJudgeError> {
    let at = args.at.unwrap_or_else(Utc::now);
    let timeline = ctx.call(ctx.engine.phase_timeline(&args.code, at)).await?;
    emit(args.format, ctx.quiet, &timeline, render)
}

fn render(timeline: &PhaseTimeline) -> String {
    let mut out = format!("{} phases at {}\n", timeline.hackathon, timeline.at.to_rfc3339());
    if timeline.phases.is_empty() {
        out.push_str("  (no phases)");
        return out;
    }
    for phase in &timeline.phases {
        let marker = if timeline.active == Some(phase.index) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>2}  {:<24} {:<9}  {} .. {}",
            phase.index,
            phase.name,
            phase.status.to_string(),
            phase.start_time.to_rfc3339(),
            phase.end_time.to_rfc3339()
        );
    }
    out.truncate(out.trim_end().len());
    out
}
