//! Metrics Extender Scheduler - Decision logic of the scheduler extender
//!
//! This crate provides:
//! - Filter: label-based node admission
//! - Prioritize: inverse CPU utilization scoring over a live metrics snapshot
//! - Preempt: pluggable victim policy (echo by default)
//! - Bind: committing the pod-to-node assignment

pub mod error;
pub mod types;
pub mod filter;
pub mod metrics;
pub mod score;
pub mod preempt;
pub mod stats;
pub mod extender;

// Re-export commonly used types
pub use error::{ExtenderError, Result};
pub use extender::{Extender, ExtenderConfig, ScoringScope, DEFAULT_ADMISSION_LABEL};
pub use preempt::{EchoVictims, PreemptionPolicy};
pub use stats::{ExtenderStats, StatsSnapshot};
pub use types::{Degradation, FilterOutcome, FilterResult, PrioritizeReport};
