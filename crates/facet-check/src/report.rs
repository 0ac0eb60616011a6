//! Consistency report types

use crate::types::{CheckKind, RepairStatus};
use serde::Serialize;

/// Result of one check within a repair pass
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub check: CheckKind,
    /// Re-run of a check after classifiers were deleted
    pub cascade: bool,
    pub found: usize,
    pub fixed: usize,
    pub failed: usize,
    /// Set when the scan itself failed and `found` is unreliable
    pub scan_error: Option<String>,
    pub status: RepairStatus,
}

impl StepOutcome {
    pub fn new(check: CheckKind, cascade: bool) -> Self {
        Self {
            check,
            cascade,
            found: 0,
            fixed: 0,
            failed: 0,
            scan_error: None,
            status: RepairStatus::None,
        }
    }

    /// One human-readable report line
    pub fn line(&self, modify: bool) -> String {
        let prefix = if self.cascade { "Recheck" } else { "Check" };
        let head = format!("{} {}", prefix, self.check.description());

        if let Some(error) = &self.scan_error {
            return format!("{}: scan failed: {}", head, error);
        }

        let mut line = format!("{}: found {}", head, self.found);
        if modify {
            line.push_str(&format!(", fixed {}", self.fixed));
            if self.failed > 0 {
                line.push_str(&format!(", failed {}", self.failed));
            }
        }
        line
    }
}

/// Outcome of a complete repair pass
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub modify: bool,
    pub steps: Vec<StepOutcome>,
    pub found: usize,
    pub fixed: usize,
    pub status: RepairStatus,
}

impl ConsistencyReport {
    pub fn new(modify: bool) -> Self {
        Self {
            modify,
            steps: Vec::new(),
            found: 0,
            fixed: 0,
            status: RepairStatus::None,
        }
    }

    /// Record a finished step, accumulating counters and status
    pub fn push(&mut self, step: StepOutcome) {
        self.found += step.found;
        self.fixed += step.fixed;
        self.status = self.status.combine(step.status);
        self.steps.push(step);
    }

    /// Derive the final status from the counters
    pub fn finish(&mut self) {
        let unresolved = if self.modify {
            self.fixed < self.found
        } else {
            self.found > 0
        };
        if unresolved {
            self.status = self.status.combine(RepairStatus::DbStructure);
        }
    }

    /// Violations found but not fixed in this pass
    pub fn unfixed(&self) -> usize {
        self.found.saturating_sub(self.fixed)
    }

    /// True if nothing was found or everything found was fixed, without errors
    pub fn is_consistent(&self) -> bool {
        self.status.is_success()
    }

    pub fn step(&self, check: CheckKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.check == check && !s.cascade)
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        let mut summary = if self.modify {
            format!("{} error(s) found, {} fixed", self.found, self.fixed)
        } else {
            format!("{} error(s) found", self.found)
        };
        summary.push_str(&format!(" [status {}]", self.status.label()));
        summary
    }
}
