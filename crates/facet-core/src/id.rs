//! Typed row references

use serde::{Deserialize, Serialize};
use std::fmt;

/// A database row id.
///
/// Optional references are stored as `NULL` columns and represented in memory
/// by [`RowId::VOID`].
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(i64);

impl RowId {
    /// The "no reference" sentinel
    pub const VOID: RowId = RowId(-1);

    /// Create a RowId from a raw value
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw i64 value
    pub fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_void(&self) -> bool {
        self.0 == Self::VOID.0
    }

    pub fn is_valid(&self) -> bool {
        !self.is_void()
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::VOID
    }
}

impl From<Option<i64>> for RowId {
    fn from(column: Option<i64>) -> Self {
        column.map(RowId).unwrap_or(RowId::VOID)
    }
}

impl From<RowId> for Option<i64> {
    fn from(id: RowId) -> Self {
        if id.is_void() {
            None
        } else {
            Some(id.0)
        }
    }
}

impl fmt::Debug for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            write!(f, "RowId(void)")
        } else {
            write!(f, "RowId({})", self.0)
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            write!(f, "void")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// The table a row reference points into
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Void,
    Classifier,
    Feature,
    Relationship,
    DiagramElement,
    Diagram,
}

impl Table {
    /// SQL table name, `None` for [`Table::Void`]
    pub fn sql_name(&self) -> Option<&'static str> {
        match self {
            Table::Void => None,
            Table::Classifier => Some("classifiers"),
            Table::Feature => Some("features"),
            Table::Relationship => Some("relationships"),
            Table::DiagramElement => Some("diagramelements"),
            Table::Diagram => Some("diagrams"),
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Table::Void => "?",
            Table::Classifier => "C",
            Table::Feature => "F",
            Table::Relationship => "R",
            Table::DiagramElement => "E",
            Table::Diagram => "D",
        }
    }
}

/// A reference to one row of one table.
///
/// A reference is valid iff both the table and the row id are non-void.
/// Equality only holds between valid references, so a void reference is not
/// equal to anything, itself included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RowRef {
    pub table: Table,
    pub row_id: RowId,
}

impl RowRef {
    pub const VOID: RowRef = RowRef {
        table: Table::Void,
        row_id: RowId::VOID,
    };

    pub const fn new(table: Table, row_id: RowId) -> Self {
        Self { table, row_id }
    }

    pub fn diagram(id: i64) -> Self {
        Self::new(Table::Diagram, RowId::new(id))
    }

    pub fn classifier(id: i64) -> Self {
        Self::new(Table::Classifier, RowId::new(id))
    }

    pub fn feature(id: i64) -> Self {
        Self::new(Table::Feature, RowId::new(id))
    }

    pub fn relationship(id: i64) -> Self {
        Self::new(Table::Relationship, RowId::new(id))
    }

    pub fn diagram_element(id: i64) -> Self {
        Self::new(Table::DiagramElement, RowId::new(id))
    }

    pub fn is_valid(&self) -> bool {
        self.table != Table::Void && self.row_id.is_valid()
    }
}

impl Default for RowRef {
    fn default() -> Self {
        Self::VOID
    }
}

impl PartialEq for RowRef {
    fn eq(&self, other: &Self) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.table == other.table
            && self.row_id == other.row_id
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}{}", self.table.prefix(), self.row_id)
        } else {
            write!(f, "void")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_row_id() {
        assert!(RowId::VOID.is_void());
        assert!(RowId::new(0).is_valid());
        assert_eq!(RowId::default(), RowId::VOID);
    }

    #[test]
    fn test_column_conversion() {
        assert_eq!(RowId::from(None), RowId::VOID);
        assert_eq!(RowId::from(Some(12)), RowId::new(12));
        assert_eq!(Option::<i64>::from(RowId::VOID), None);
        assert_eq!(Option::<i64>::from(RowId::new(3)), Some(3));
    }

    #[test]
    fn test_validity() {
        assert!(RowRef::diagram(1).is_valid());
        assert!(!RowRef::VOID.is_valid());
        assert!(!RowRef::new(Table::Void, RowId::new(1)).is_valid());
        assert!(!RowRef::new(Table::Feature, RowId::VOID).is_valid());
    }

    #[test]
    fn test_equality_requires_validity() {
        assert_eq!(RowRef::feature(4), RowRef::feature(4));
        assert_ne!(RowRef::feature(4), RowRef::classifier(4));
        assert_ne!(RowRef::feature(4), RowRef::feature(5));
        assert_ne!(RowRef::VOID, RowRef::VOID);
    }

    #[test]
    fn test_display() {
        assert_eq!(RowRef::diagram_element(9).to_string(), "E9");
        assert_eq!(RowRef::relationship(2).to_string(), "R2");
        assert_eq!(RowRef::VOID.to_string(), "void");
    }
}
