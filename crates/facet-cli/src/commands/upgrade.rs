//! Schema upgrade command

use anyhow::{bail, Context, Result};
use facet_check::{CheckConfig, ConsistencyChecker};
use facet_core::Table;
use facet_store::{Database, SCHEMA_VERSION};
use std::io;
use std::path::Path;

const TABLES: [Table; 5] = [
    Table::Diagram,
    Table::Classifier,
    Table::Feature,
    Table::Relationship,
    Table::DiagramElement,
];

pub fn run(database: &str, config: CheckConfig) -> Result<()> {
    let path = Path::new(database);
    if !path.exists() {
        bail!("Database {} does not exist", database);
    }

    // opening read-write applies pending migrations
    let db = Database::open(path).with_context(|| format!("Failed to upgrade {}", database))?;
    println!(
        "Schema version {} (current {})",
        db.schema_version()?,
        SCHEMA_VERSION
    );

    let reader = db.reader();
    for table in TABLES {
        if let Some(name) = table.sql_name() {
            println!("  {:<16} {}", name, reader.count(table)?);
        }
    }
    println!();

    let report = ConsistencyChecker::new(&db, config).check(&mut io::stdout().lock());
    if !report.is_consistent() {
        println!("Run `facet repair {}` to fix the reported problems.", database);
    }
    Ok(())
}
