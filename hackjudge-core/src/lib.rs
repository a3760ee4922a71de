//! `hackjudge` Core: shared hackathon model and error types
//!
//! This crate provides the data model (hackathons, phases, registrations,
//! submissions, scores) and the configuration error types shared by the
//! `hackjudge` engine and CLI.

pub mod error;
pub mod model;

pub use model::{
    DeliverableSpec, Hackathon, Phase, Registration, Score, Submission, TeamId,
};
