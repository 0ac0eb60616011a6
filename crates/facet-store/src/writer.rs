//! Row-level write access
//!
//! Every write runs in its own transaction and is committed before the call
//! returns.

use crate::database::Database;
use facet_core::{
    Classifier, Diagram, DiagramElement, FacetError, Feature, Relationship, RelationshipSide,
    Result, RowId, RowRef,
};
use log::debug;
use rusqlite::{params, Transaction};

/// Writes model rows
pub struct Writer<'a> {
    db: &'a Database,
}

impl<'a> Writer<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Delete one row; deleting a row that does not exist is not an error.
    ///
    /// Returns the number of rows removed.
    pub fn delete_row(&self, row_ref: RowRef) -> Result<usize> {
        let table = match row_ref.table.sql_name() {
            Some(name) if row_ref.is_valid() => name,
            _ => {
                return Err(FacetError::InvalidRequest(format!(
                    "cannot delete {}",
                    row_ref
                )))
            }
        };

        let deleted = self.in_transaction(|tx| {
            tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1", table),
                params![row_ref.row_id.raw()],
            )
        })?;
        debug!("Deleted {} ({} row(s))", row_ref, deleted);
        Ok(deleted)
    }

    /// Set a diagram element's focused feature to void
    pub fn clear_focused_feature(&self, diagram_element_id: RowId) -> Result<usize> {
        self.in_transaction(|tx| {
            tx.execute(
                "UPDATE diagramelements SET focused_feature_id = NULL WHERE id = ?1",
                params![diagram_element_id.raw()],
            )
        })
    }

    /// Set one feature end of a relationship to void
    pub fn clear_relationship_feature(
        &self,
        relationship_id: RowId,
        side: RelationshipSide,
    ) -> Result<usize> {
        let sql = match side {
            RelationshipSide::From => {
                "UPDATE relationships SET from_feature_id = NULL WHERE id = ?1"
            }
            RelationshipSide::To => "UPDATE relationships SET to_feature_id = NULL WHERE id = ?1",
        };
        self.in_transaction(|tx| tx.execute(sql, params![relationship_id.raw()]))
    }

    /// Point a diagram at a new parent; a void parent makes it a root
    pub fn set_diagram_parent(&self, diagram_id: RowId, parent_id: RowId) -> Result<usize> {
        self.in_transaction(|tx| {
            tx.execute(
                "UPDATE diagrams SET parent_id = ?1 WHERE id = ?2",
                params![Option::<i64>::from(parent_id), diagram_id.raw()],
            )
        })
    }

    /// Insert a diagram; a void id lets the database choose one
    pub fn create_diagram(&self, diagram: &Diagram) -> Result<RowId> {
        self.insert(|tx| {
            tx.execute(
                "INSERT INTO diagrams (id, parent_id, diagram_type, stereotype, name, description, \
                 list_order, display_flags, uuid) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    Option::<i64>::from(diagram.id),
                    Option::<i64>::from(diagram.parent_id),
                    diagram.diagram_type,
                    diagram.stereotype,
                    diagram.name,
                    diagram.description,
                    diagram.list_order,
                    diagram.display_flags,
                    uuid_or_new(&diagram.uuid),
                ],
            )
        })
    }

    pub fn create_classifier(&self, classifier: &Classifier) -> Result<RowId> {
        self.insert(|tx| {
            tx.execute(
                "INSERT INTO classifiers (id, main_type, stereotype, name, description, x_order, \
                 y_order, list_order, uuid) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    Option::<i64>::from(classifier.id),
                    classifier.main_type,
                    classifier.stereotype,
                    classifier.name,
                    classifier.description,
                    classifier.x_order,
                    classifier.y_order,
                    classifier.list_order,
                    uuid_or_new(&classifier.uuid),
                ],
            )
        })
    }

    pub fn create_feature(&self, feature: &Feature) -> Result<RowId> {
        self.insert(|tx| {
            tx.execute(
                "INSERT INTO features (id, main_type, classifier_id, key, value, description, \
                 list_order, uuid) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Option::<i64>::from(feature.id),
                    feature.main_type,
                    feature.classifier_id.raw(),
                    feature.key,
                    feature.value,
                    feature.description,
                    feature.list_order,
                    uuid_or_new(&feature.uuid),
                ],
            )
        })
    }

    pub fn create_relationship(&self, relationship: &Relationship) -> Result<RowId> {
        self.insert(|tx| {
            tx.execute(
                "INSERT INTO relationships (id, main_type, from_classifier_id, to_classifier_id, \
                 from_feature_id, to_feature_id, name, description, list_order, uuid) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    Option::<i64>::from(relationship.id),
                    relationship.main_type,
                    relationship.from_classifier_id.raw(),
                    relationship.to_classifier_id.raw(),
                    Option::<i64>::from(relationship.from_feature_id),
                    Option::<i64>::from(relationship.to_feature_id),
                    relationship.name,
                    relationship.description,
                    relationship.list_order,
                    uuid_or_new(&relationship.uuid),
                ],
            )
        })
    }

    pub fn create_diagram_element(&self, element: &DiagramElement) -> Result<RowId> {
        self.insert(|tx| {
            tx.execute(
                "INSERT INTO diagramelements (id, diagram_id, classifier_id, display_flags, \
                 focused_feature_id, uuid) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Option::<i64>::from(element.id),
                    element.diagram_id.raw(),
                    element.classifier_id.raw(),
                    element.display_flags,
                    Option::<i64>::from(element.focused_feature_id),
                    uuid_or_new(&element.uuid),
                ],
            )
        })
    }

    fn insert(&self, op: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<usize>) -> Result<RowId> {
        self.in_transaction(|tx| {
            op(tx)?;
            Ok(RowId::new(tx.last_insert_rowid()))
        })
    }

    fn in_transaction<T>(
        &self,
        op: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let conn = self.db.connection()?;
        if self.db.is_read_only() {
            return Err(FacetError::ReadOnlyDb);
        }

        let tx = conn.unchecked_transaction()?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn uuid_or_new(uuid: &str) -> String {
    if uuid.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        uuid.to_string()
    }
}
