//! Database handle with open/close state

use crate::reader::Reader;
use crate::schema;
use crate::writer::Writer;
use facet_core::{FacetError, Result};
use log::{debug, info, warn};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// An optionally open model database.
///
/// A closed handle is a valid value: every operation on it fails with
/// [`FacetError::NoDatabase`].
#[derive(Debug, Default)]
pub struct Database {
    conn: Option<Connection>,
    read_only: bool,
    path: Option<PathBuf>,
}

impl Database {
    /// Create a handle that is not connected to any database
    pub fn closed() -> Self {
        Self::default()
    }

    /// Open (or create) a database file for reading and writing.
    ///
    /// Pending schema migrations are applied before the handle is returned.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database {}", path.display());
        let mut conn = Connection::open(path)?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Some(conn),
            read_only: false,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an existing database file without write access.
    ///
    /// The schema is never migrated in this mode.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database {} read-only", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let version = schema::current_version(&conn)?;
        if version != schema::SCHEMA_VERSION {
            warn!(
                "Read-only database has schema version {} (current is {})",
                version,
                schema::SCHEMA_VERSION
            );
        }

        Ok(Self {
            conn: Some(conn),
            read_only: true,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database with the current schema
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        schema::migrate(&mut conn)?;
        Ok(Self {
            conn: Some(conn),
            read_only: false,
            path: None,
        })
    }

    /// Close the connection; closing a closed handle is a no-op
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            debug!("Closing database");
            conn.close().map_err(|(_, err)| FacetError::from(err))?;
        }
        self.read_only = false;
        self.path = None;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Path of the database file, `None` for in-memory or closed handles
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the open connection
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(FacetError::NoDatabase)
    }

    /// Schema version stored in the open database
    pub fn schema_version(&self) -> Result<i64> {
        schema::current_version(self.connection()?)
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self)
    }

    pub fn writer(&self) -> Writer<'_> {
        Writer::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::{Diagram, RowId};

    #[test]
    fn test_closed_database() {
        let db = Database::closed();
        assert!(!db.is_open());
        assert!(matches!(db.connection(), Err(FacetError::NoDatabase)));
        assert!(matches!(db.schema_version(), Err(FacetError::NoDatabase)));
    }

    #[test]
    fn test_in_memory_database_is_current() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_open());
        assert!(!db.is_read_only());
        assert!(db.path().is_none());
        assert_eq!(db.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        assert!(!db.is_open());
        db.close().unwrap();
    }

    #[test]
    fn test_reopen_file_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cfu1");

        let mut db = Database::open(&path).unwrap();
        db.writer()
            .create_diagram(&Diagram::new(1, RowId::VOID, "root"))
            .unwrap();
        db.close().unwrap();

        let db = Database::open_read_only(&path).unwrap();
        assert!(db.is_read_only());
        assert_eq!(db.path(), Some(path.as_path()));
        assert_eq!(db.reader().diagram(RowId::new(1)).unwrap().name, "root");
    }

    #[test]
    fn test_read_only_open_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Database::open_read_only(dir.path().join("missing.cfu1"));
        assert!(matches!(result, Err(FacetError::Database(_))));
    }
}
