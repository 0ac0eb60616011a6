//! Consistency orchestrator
//!
//! Runs the checks in their fixed order, repairs when authorized and writes
//! one report line per check to the caller's sink.

use crate::config::CheckConfig;
use crate::repair::Repairer;
use crate::report::{ConsistencyReport, StepOutcome};
use crate::scan::ConsistencyScanner;
use crate::types::{CheckKind, RepairStatus};
use facet_store::Database;
use log::{debug, info, warn};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Scanning,
    Reporting,
    Repairing,
}

/// Checks and repairs the structural consistency of a model database
pub struct ConsistencyChecker<'a> {
    db: &'a Database,
    config: CheckConfig,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(db: &'a Database, config: CheckConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Run a check-only pass; the database is never modified
    pub fn check<W: Write>(&self, out: &mut W) -> ConsistencyReport {
        self.repair_database(false, out)
    }

    /// Run all checks; repair every violation found when `modify` is set.
    ///
    /// Each repair commits on its own, so an interrupted pass leaves a
    /// partially repaired database. A second pass finding nothing is the
    /// signal that the database is fully repaired.
    pub fn repair_database<W: Write>(&self, modify: bool, out: &mut W) -> ConsistencyReport {
        let mut report = ConsistencyReport::new(modify);

        if !self.db.is_open() {
            report.status = RepairStatus::NoDb;
            emit(out, "No database opened.");
            return report;
        }

        info!(
            "Starting consistency {} pass",
            if modify { "repair" } else { "check" }
        );
        let scanner = ConsistencyScanner::new(self.db, self.config.max_rows);
        let repairer = Repairer::new(self.db, self.config.optional_reference_policy);

        for kind in CheckKind::ORDERED {
            let step = self.run_step(&scanner, &repairer, kind, false, modify);
            emit(out, &step.line(modify));
            report.push(step);
        }

        let classifiers_deleted = report
            .step(CheckKind::UnreferencedClassifiers)
            .map(|s| s.fixed > 0)
            .unwrap_or(false);
        if modify && self.config.cascade_sweep && classifiers_deleted {
            debug!("Classifiers were deleted, rechecking their features and relationships");
            for kind in CheckKind::CASCADE_SWEEP {
                let step = self.run_step(&scanner, &repairer, kind, true, modify);
                emit(out, &step.line(modify));
                report.push(step);
            }
        }

        report.finish();
        emit(out, &report.summary());
        info!("Consistency pass finished: {}", report.summary());
        report
    }

    fn run_step(
        &self,
        scanner: &ConsistencyScanner<'_>,
        repairer: &Repairer<'_>,
        kind: CheckKind,
        cascade: bool,
        modify: bool,
    ) -> StepOutcome {
        let mut phase = Phase::Idle;
        let mut step = StepOutcome::new(kind, cascade);

        transition(&mut phase, Phase::Scanning, kind);
        let violations = match scanner.scan(kind) {
            Ok(violations) => violations,
            Err(err) => {
                warn!("Scan of {} failed: {}", kind.description(), err);
                step.status = RepairStatus::from(&err).combine(RepairStatus::AtDb);
                step.scan_error = Some(err.to_string());
                transition(&mut phase, Phase::Reporting, kind);
                transition(&mut phase, Phase::Idle, kind);
                return step;
            }
        };
        step.found = violations.len();

        if modify && !violations.is_empty() {
            transition(&mut phase, Phase::Repairing, kind);
            for violation in &violations {
                match repairer.repair(kind, violation) {
                    Ok(_) => step.fixed += 1,
                    Err(err) => {
                        warn!("Repair of {} failed: {}", violation, err);
                        step.failed += 1;
                        step.status = step.status.combine(RepairStatus::from(&err));
                    }
                }
            }
        } else {
            transition(&mut phase, Phase::Reporting, kind);
        }

        transition(&mut phase, Phase::Idle, kind);
        step
    }
}

fn transition(phase: &mut Phase, next: Phase, kind: CheckKind) {
    debug!("{}: {:?} -> {:?}", kind.description(), phase, next);
    *phase = next;
}

fn emit<W: Write>(out: &mut W, line: &str) {
    if let Err(err) = writeln!(out, "{}", line) {
        warn!("Failed to write report line: {}", err);
    }
}
