//! Command-line interface
//!
//! Argument definitions and command handlers for the `hackjudge` binary.

pub mod args;
pub mod commands;
