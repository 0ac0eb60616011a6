//! Database consistency repair command

use anyhow::Result;
use facet_check::{CheckConfig, ConsistencyChecker, ConsistencyReport};
use facet_core::FacetError;
use facet_store::Database;
use log::{info, warn};
use std::io;
use std::path::Path;

pub struct RepairArgs {
    pub database: String,
    pub check_only: bool,
    pub format: String,
    pub config: CheckConfig,
}

pub fn run(args: RepairArgs) -> Result<()> {
    let db = open_database(Path::new(&args.database), args.check_only)?;
    let checker = ConsistencyChecker::new(&db, args.config);
    let modify = !args.check_only;

    let report = if args.format == "json" {
        let report = checker.repair_database(modify, &mut io::sink());
        print_report_json(&report)?;
        report
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        checker.repair_database(modify, &mut out)
    };

    if !report.is_consistent() {
        std::process::exit(report.status.exit_code());
    }
    Ok(())
}

/// Open the database the way the pass needs it.
///
/// A missing file yields a closed handle so the pass reports `NO_DB`. A file
/// that cannot be opened for writing is opened read-only, and the repairs
/// then fail with `READ_ONLY_DB`.
pub fn open_database(path: &Path, check_only: bool) -> Result<Database> {
    if !path.exists() {
        warn!("Database {} does not exist", path.display());
        return Ok(Database::closed());
    }

    if check_only {
        return Ok(Database::open_read_only(path)?);
    }

    match Database::open(path) {
        Ok(db) => Ok(db),
        Err(FacetError::ReadOnlyDb) | Err(FacetError::Database(_)) => {
            info!("Opening {} read-only", path.display());
            Ok(Database::open_read_only(path)?)
        }
        Err(err) => Err(err.into()),
    }
}

fn print_report_json(report: &ConsistencyReport) -> Result<()> {
    let steps: Vec<serde_json::Value> = report
        .steps
        .iter()
        .map(|step| {
            serde_json::json!({
                "check": step.check,
                "description": step.check.description(),
                "cascade": step.cascade,
                "found": step.found,
                "fixed": step.fixed,
                "failed": step.failed,
                "scan_error": step.scan_error,
                "status": step.status.label(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "consistent": report.is_consistent(),
        "modify": report.modify,
        "summary": report.summary(),
        "found": report.found,
        "fixed": report.fixed,
        "status": report.status.label(),
        "steps": steps,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
