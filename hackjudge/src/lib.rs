//! `hackjudge`: phase-scoped judging for hackathons
//!
//! Records judges' scores per (team, phase), ranks teams per phase or
//! overall, and eliminates the lowest-ranked teams by score threshold.
//! Persistence goes through the [`store::HackathonStore`] trait.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod judging;
pub mod locks;
pub mod observability;
pub mod phase;
pub mod store;

pub use engine::{JudgingEngine, PhaseTimeline, Principal};
