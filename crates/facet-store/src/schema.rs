//! Table definitions and schema migrations

use facet_core::{FacetError, Result};
use log::{debug, info};
use rusqlite::{params, Connection, Transaction};

/// The schema version written by this build
pub const SCHEMA_VERSION: i64 = 2;

const TABLES: [&str; 5] = [
    "classifiers",
    "features",
    "relationships",
    "diagrams",
    "diagramelements",
];

struct Migration {
    version: i64,
    description: &'static str,
    apply: fn(&Transaction<'_>) -> rusqlite::Result<()>,
}

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        description: "create model tables",
        apply: create_tables,
    },
    Migration {
        version: 2,
        description: "add uuid columns",
        apply: add_uuid_columns,
    },
];

/// Read the schema version stored in the database header
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply all pending migrations, each inside its own transaction.
///
/// Returns the number of migrations applied.
pub fn migrate(conn: &mut Connection) -> Result<usize> {
    let start = current_version(conn)?;
    if start > SCHEMA_VERSION {
        return Err(FacetError::Migration {
            version: start,
            reason: format!(
                "database schema is newer than supported version {}",
                SCHEMA_VERSION
            ),
        });
    }

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > start) {
        debug!("Applying schema migration {}: {}", migration.version, migration.description);

        let to_migration_error = |err: rusqlite::Error| FacetError::Migration {
            version: migration.version,
            reason: err.to_string(),
        };

        let tx = conn.transaction().map_err(to_migration_error)?;
        (migration.apply)(&tx).map_err(to_migration_error)?;
        tx.pragma_update(None, "user_version", migration.version)
            .map_err(to_migration_error)?;
        tx.commit().map_err(to_migration_error)?;
        applied += 1;
    }

    if applied > 0 {
        info!(
            "Upgraded database schema from version {} to {}",
            start, SCHEMA_VERSION
        );
    }
    Ok(applied)
}

fn create_tables(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS classifiers (
            id INTEGER PRIMARY KEY ASC,
            main_type INTEGER NOT NULL DEFAULT 0,
            stereotype TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            x_order INTEGER NOT NULL DEFAULT 0,
            y_order INTEGER NOT NULL DEFAULT 0,
            list_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS features (
            id INTEGER PRIMARY KEY ASC,
            main_type INTEGER NOT NULL DEFAULT 0,
            classifier_id INTEGER NOT NULL,
            key TEXT NOT NULL DEFAULT '',
            value TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            list_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS relationships (
            id INTEGER PRIMARY KEY ASC,
            main_type INTEGER NOT NULL DEFAULT 0,
            from_classifier_id INTEGER NOT NULL,
            to_classifier_id INTEGER NOT NULL,
            from_feature_id INTEGER DEFAULT NULL,
            to_feature_id INTEGER DEFAULT NULL,
            name TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            list_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS diagrams (
            id INTEGER PRIMARY KEY ASC,
            parent_id INTEGER DEFAULT NULL,
            diagram_type INTEGER NOT NULL DEFAULT 0,
            stereotype TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            list_order INTEGER NOT NULL DEFAULT 0,
            display_flags INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS diagramelements (
            id INTEGER PRIMARY KEY ASC,
            diagram_id INTEGER NOT NULL,
            classifier_id INTEGER NOT NULL,
            display_flags INTEGER NOT NULL DEFAULT 0,
            focused_feature_id INTEGER DEFAULT NULL
        );

        CREATE INDEX IF NOT EXISTS features_classifier_index ON features (classifier_id);
        CREATE INDEX IF NOT EXISTS diagramelements_diagram_index ON diagramelements (diagram_id);
        CREATE INDEX IF NOT EXISTS diagramelements_classifier_index ON diagramelements (classifier_id);
        "#,
    )
}

fn add_uuid_columns(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    for table in TABLES {
        tx.execute(
            &format!(
                "ALTER TABLE {} ADD COLUMN uuid TEXT NOT NULL DEFAULT ''",
                table
            ),
            [],
        )?;

        let ids: Vec<i64> = {
            let mut stmt = tx.prepare(&format!("SELECT id FROM {} WHERE uuid = ''", table))?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut update = tx.prepare(&format!("UPDATE {} SET uuid = ?1 WHERE id = ?2", table))?;
        for id in &ids {
            update.execute(params![uuid::Uuid::new_v4().to_string(), id])?;
        }
        debug!("Assigned uuids to {} row(s) of {}", ids.len(), table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_migrates_to_current() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);

        let applied = migrate(&mut conn).unwrap();
        assert_eq!(applied, MIGRATIONS.len());
        assert_eq!(current_version(&conn).unwrap(), SCHEMA_VERSION);

        // A second run is a no-op
        assert_eq!(migrate(&mut conn).unwrap(), 0);
    }

    #[test]
    fn test_uuid_backfill_for_version_one_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        {
            let tx = conn.transaction().unwrap();
            create_tables(&tx).unwrap();
            tx.pragma_update(None, "user_version", 1).unwrap();
            tx.commit().unwrap();
        }
        conn.execute("INSERT INTO classifiers (id, name) VALUES (1, 'Engine')", [])
            .unwrap();
        conn.execute("INSERT INTO classifiers (id, name) VALUES (2, 'Wheel')", [])
            .unwrap();

        assert_eq!(migrate(&mut conn).unwrap(), 1);

        let uuids: Vec<String> = {
            let mut stmt = conn.prepare("SELECT uuid FROM classifiers ORDER BY id").unwrap();
            let rows = stmt.query_map([], |row| row.get(0)).unwrap();
            rows.collect::<rusqlite::Result<Vec<_>>>().unwrap()
        };
        assert_eq!(uuids.len(), 2);
        assert!(uuids.iter().all(|u| u.len() == 36));
        assert_ne!(uuids[0], uuids[1]);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
        let err = migrate(&mut conn).unwrap_err();
        assert!(matches!(err, FacetError::Migration { version, .. } if version == SCHEMA_VERSION + 1));
    }
}
