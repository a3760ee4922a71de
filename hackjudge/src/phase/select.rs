//! Phase selection at the boundary.
//!
//! Callers may name a phase by index or by display name; the engine only
//! ever sees the resolved index.

use std::str::FromStr;

use hackjudge_core::Hackathon;

use crate::error::PhaseNotFound;

/// Maximum Damerau-Levenshtein distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A phase as named by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseSelector {
    /// Zero-based position
    Index(usize),
    /// Display name
    Name(String),
}

impl FromStr for PhaseSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed.parse::<usize>().map_or_else(
            |_| Self::Name(trimmed.to_string()),
            Self::Index,
        ))
    }
}

impl std::fmt::Display for PhaseSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => write!(f, "{n}"),
        }
    }
}

/// Resolves `selector` to a valid index into `hackathon.phases`.
///
/// Names match exactly first, then case-insensitively.
///
/// # Errors
///
/// Returns [`PhaseNotFound`] for an out-of-range index or an unknown name;
/// unknown names carry the closest phase name when one is near enough.
pub fn resolve_phase(hackathon: &Hackathon, selector: &PhaseSelector) -> Result<usize, PhaseNotFound> {
    match selector {
        PhaseSelector::Index(index) => {
            if *index < hackathon.phases.len() {
                Ok(*index)
            } else {
                Err(PhaseNotFound::index(*index))
            }
        }
        PhaseSelector::Name(name) => hackathon
            .phases
            .iter()
            .position(|p| p.name == *name)
            .or_else(|| {
                hackathon
                    .phases
                    .iter()
                    .position(|p| p.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| PhaseNotFound {
                selector: name.clone(),
                suggestion: suggest_phase(hackathon, name),
            }),
    }
}

fn suggest_phase(hackathon: &Hackathon, input: &str) -> Option<String> {
    let needle = input.to_lowercase();
    hackathon
        .phases
        .iter()
        .map(|p| {
            (
                p.name.as_str(),
                strsim::damerau_levenshtein(&needle, &p.name.to_lowercase()),
            )
        })
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}
