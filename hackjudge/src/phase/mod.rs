//! Phase lifecycle
//!
//! Maps phase time windows to lifecycle states and resolves user-facing
//! phase selectors to indices.
//!
//! # Architecture
//!
//! - [`clock`]: `status`, the active phase and the full timeline for an instant
//! - [`select`]: index-or-name resolution at the boundary, with typo suggestions

pub mod clock;
pub mod select;

pub use clock::{PhaseSnapshot, PhaseStatus, active_phase, status, timeline};
pub use select::{PhaseSelector, resolve_phase};
