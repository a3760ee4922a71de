//! Configuration module
//!
//! Handles the optional engine configuration file and the loading and
//! validation of hackathon snapshots.

pub mod loader;
pub mod validation;

pub use loader::{
    ConfigLimits, ConfigLoader, DEFAULT_STORE_DIR, EngineConfig, LoadResult, LoadWarning,
    StoreConfig, parse_snapshot, parse_timeout,
};
pub use validation::{ValidationResult, Validator};
