//! Facet Check - Model consistency checks and repair
//!
//! This crate scans a model database for structural violations, repairs
//! them when asked to, and reports per-check counts together with an
//! aggregate status.

mod checker;
mod config;
mod repair;
mod report;
mod scan;
mod types;

#[cfg(test)]
mod fixtures;

pub use checker::ConsistencyChecker;
pub use config::CheckConfig;
pub use repair::{RepairAction, Repairer};
pub use report::{ConsistencyReport, StepOutcome};
pub use scan::ConsistencyScanner;
pub use types::{CheckKind, OptionalReferencePolicy, RepairStatus};
