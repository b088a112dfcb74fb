//! Structured logging and cycle statistics for ThetaGang.
//!
//! - `init_logging`: tracing subscriber with `RUST_LOG` override, JSON in production
//! - `CycleStats`: per-symbol recommendation and approval counts for one cycle

pub mod cycle_stats;
pub mod error;
pub mod logging;

pub use cycle_stats::{CycleStats, Outcome, SymbolCycleStats};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{build_filter, init_logging};
