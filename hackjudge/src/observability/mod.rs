//! Observability module
//!
//! Logging, metrics, and the JSONL audit trail for judging operations.

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter};
pub use logging::{LogFormat, init_logging};
pub use metrics::describe_metrics;
