//! `hackjudge list`: the hackathons in the store.

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::error::HackJudgeError;

use super::{Context, emit};

#[derive(Debug, Serialize)]
struct Listing {
    hackathons: Vec<String>,
}

/// Print the code of every stored hackathon, sorted.
///
/// # Errors
///
/// Returns a store error if the store directory cannot be read.
pub async fn run(ctx: &Context, args: &ListArgs) -> Result<(), HackJudgeError> {
    let hackathons = ctx.call(ctx.engine.codes()).await?;
    emit(args.format, ctx.quiet, &Listing { hackathons }, render)
}

fn render(listing: &Listing) -> String {
    if listing.hackathons.is_empty() {
        return "no hackathons in store".to_string();
    }
    listing.hackathons.join("\n")
}
