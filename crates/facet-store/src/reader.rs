//! Row-level read access

use crate::database::Database;
use facet_core::{
    Classifier, Diagram, DiagramElement, FacetError, Feature, Relationship, Result, RowId,
    RowRef, Table,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::VecDeque;

const FEATURE_PAGE_SIZE: usize = 64;

const DIAGRAM_COLUMNS: &str =
    "id, parent_id, diagram_type, stereotype, name, description, list_order, display_flags, uuid";
const CLASSIFIER_COLUMNS: &str =
    "id, main_type, stereotype, name, description, x_order, y_order, list_order, uuid";
const FEATURE_COLUMNS: &str =
    "id, main_type, classifier_id, key, value, description, list_order, uuid";
const RELATIONSHIP_COLUMNS: &str = "id, main_type, from_classifier_id, to_classifier_id, \
     from_feature_id, to_feature_id, name, description, list_order, uuid";
const DIAGRAM_ELEMENT_COLUMNS: &str =
    "id, diagram_id, classifier_id, display_flags, focused_feature_id, uuid";

/// Reads model rows by id
pub struct Reader<'a> {
    db: &'a Database,
}

impl<'a> Reader<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn diagram(&self, id: RowId) -> Result<Diagram> {
        self.row_by_id(Table::Diagram, DIAGRAM_COLUMNS, id, diagram_from_row)
    }

    pub fn classifier(&self, id: RowId) -> Result<Classifier> {
        self.row_by_id(Table::Classifier, CLASSIFIER_COLUMNS, id, classifier_from_row)
    }

    pub fn feature(&self, id: RowId) -> Result<Feature> {
        self.row_by_id(Table::Feature, FEATURE_COLUMNS, id, feature_from_row)
    }

    pub fn relationship(&self, id: RowId) -> Result<Relationship> {
        self.row_by_id(
            Table::Relationship,
            RELATIONSHIP_COLUMNS,
            id,
            relationship_from_row,
        )
    }

    pub fn diagram_element(&self, id: RowId) -> Result<DiagramElement> {
        self.row_by_id(
            Table::DiagramElement,
            DIAGRAM_ELEMENT_COLUMNS,
            id,
            diagram_element_from_row,
        )
    }

    /// Iterate over the features of a classifier, ordered by id.
    ///
    /// Rows are fetched lazily one page at a time; calling this again
    /// restarts from the first feature.
    pub fn features_of_classifier(&self, classifier_id: RowId) -> Result<FeatureIter<'a>> {
        Ok(FeatureIter {
            conn: self.db.connection()?,
            classifier_id,
            after: i64::MIN,
            page: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Number of rows in a table
    pub fn count(&self, table: Table) -> Result<i64> {
        let name = table.sql_name().ok_or_else(|| {
            FacetError::InvalidRequest("cannot count rows of the void table".to_string())
        })?;
        let count = self.db.connection()?.query_row(
            &format!("SELECT COUNT(*) FROM {}", name),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn row_by_id<T>(
        &self,
        table: Table,
        columns: &str,
        id: RowId,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let row_ref = RowRef::new(table, id);
        let name = match table.sql_name() {
            Some(name) if id.is_valid() => name,
            _ => return Err(FacetError::InvalidRequest(format!("cannot read {}", row_ref))),
        };

        let sql = format!("SELECT {} FROM {} WHERE id = ?1", columns, name);
        self.db
            .connection()?
            .query_row(&sql, params![id.raw()], map)
            .optional()?
            .ok_or(FacetError::NotFound(row_ref))
    }
}

/// Lazy, finite sequence of the features owned by one classifier
pub struct FeatureIter<'a> {
    conn: &'a Connection,
    classifier_id: RowId,
    after: i64,
    page: VecDeque<Feature>,
    exhausted: bool,
}

impl FeatureIter<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM features WHERE classifier_id = ?1 AND id > ?2 ORDER BY id ASC LIMIT ?3",
            FEATURE_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![
                self.classifier_id.raw(),
                self.after,
                FEATURE_PAGE_SIZE as i64
            ],
            feature_from_row,
        )?;
        for row in rows {
            self.page.push_back(row?);
        }

        if self.page.len() < FEATURE_PAGE_SIZE {
            self.exhausted = true;
        }
        if let Some(last) = self.page.back() {
            self.after = last.id.raw();
        }
        Ok(())
    }
}

impl Iterator for FeatureIter<'_> {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
        self.page.pop_front().map(Ok)
    }
}

fn diagram_from_row(row: &Row<'_>) -> rusqlite::Result<Diagram> {
    Ok(Diagram {
        id: RowId::new(row.get(0)?),
        parent_id: RowId::from(row.get::<_, Option<i64>>(1)?),
        diagram_type: row.get(2)?,
        stereotype: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        list_order: row.get(6)?,
        display_flags: row.get(7)?,
        uuid: row.get(8)?,
    })
}

fn classifier_from_row(row: &Row<'_>) -> rusqlite::Result<Classifier> {
    Ok(Classifier {
        id: RowId::new(row.get(0)?),
        main_type: row.get(1)?,
        stereotype: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        x_order: row.get(5)?,
        y_order: row.get(6)?,
        list_order: row.get(7)?,
        uuid: row.get(8)?,
    })
}

fn feature_from_row(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: RowId::new(row.get(0)?),
        main_type: row.get(1)?,
        classifier_id: RowId::new(row.get(2)?),
        key: row.get(3)?,
        value: row.get(4)?,
        description: row.get(5)?,
        list_order: row.get(6)?,
        uuid: row.get(7)?,
    })
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: RowId::new(row.get(0)?),
        main_type: row.get(1)?,
        from_classifier_id: RowId::new(row.get(2)?),
        to_classifier_id: RowId::new(row.get(3)?),
        from_feature_id: RowId::from(row.get::<_, Option<i64>>(4)?),
        to_feature_id: RowId::from(row.get::<_, Option<i64>>(5)?),
        name: row.get(6)?,
        description: row.get(7)?,
        list_order: row.get(8)?,
        uuid: row.get(9)?,
    })
}

fn diagram_element_from_row(row: &Row<'_>) -> rusqlite::Result<DiagramElement> {
    Ok(DiagramElement {
        id: RowId::new(row.get(0)?),
        diagram_id: RowId::new(row.get(1)?),
        classifier_id: RowId::new(row.get(2)?),
        display_flags: row.get(3)?,
        focused_feature_id: RowId::from(row.get::<_, Option<i64>>(4)?),
        uuid: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Database {
        let db = Database::open_in_memory().unwrap();
        let writer = db.writer();
        writer
            .create_diagram(&Diagram::new(1, RowId::VOID, "overview"))
            .unwrap();
        writer.create_classifier(&Classifier::new(10, "Engine")).unwrap();
        writer.create_classifier(&Classifier::new(11, "Wheel")).unwrap();
        for id in 100..230 {
            writer
                .create_feature(&Feature::new(id, 10, format!("f{}", id)))
                .unwrap();
        }
        writer.create_feature(&Feature::new(300, 11, "axle")).unwrap();
        writer
            .create_relationship(&Relationship::new(20, 10, 11).with_features(RowId::new(100), RowId::VOID))
            .unwrap();
        writer
            .create_diagram_element(&DiagramElement::new(30, 1, 10).with_focused_feature(RowId::new(101)))
            .unwrap();
        db
    }

    #[test]
    fn test_read_rows_by_id() {
        let db = populated();
        let reader = db.reader();

        let diagram = reader.diagram(RowId::new(1)).unwrap();
        assert!(diagram.is_root());
        assert_eq!(diagram.name, "overview");
        assert_eq!(diagram.uuid.len(), 36);

        assert_eq!(reader.classifier(RowId::new(11)).unwrap().name, "Wheel");
        assert_eq!(reader.feature(RowId::new(300)).unwrap().key, "axle");

        let rel = reader.relationship(RowId::new(20)).unwrap();
        assert_eq!(rel.from_feature_id, RowId::new(100));
        assert!(rel.to_feature_id.is_void());

        let element = reader.diagram_element(RowId::new(30)).unwrap();
        assert_eq!(element.focused_feature_id, RowId::new(101));
    }

    #[test]
    fn test_missing_row_is_not_found() {
        let db = populated();
        let err = db.reader().classifier(RowId::new(999)).unwrap_err();
        assert!(matches!(err, FacetError::NotFound(r) if r == RowRef::classifier(999)));
    }

    #[test]
    fn test_void_id_is_invalid_request() {
        let db = populated();
        assert!(matches!(
            db.reader().feature(RowId::VOID),
            Err(FacetError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_features_of_classifier_spans_pages() {
        let db = populated();
        let reader = db.reader();

        let keys: Vec<String> = reader
            .features_of_classifier(RowId::new(10))
            .unwrap()
            .map(|f| f.unwrap().key)
            .collect();
        assert_eq!(keys.len(), 130);
        assert_eq!(keys.first().map(String::as_str), Some("f100"));
        assert_eq!(keys.last().map(String::as_str), Some("f229"));

        // Restartable
        assert_eq!(reader.features_of_classifier(RowId::new(10)).unwrap().count(), 130);
        assert_eq!(reader.features_of_classifier(RowId::new(11)).unwrap().count(), 1);
        assert_eq!(reader.features_of_classifier(RowId::new(12)).unwrap().count(), 0);
    }

    #[test]
    fn test_count() {
        let db = populated();
        let reader = db.reader();
        assert_eq!(reader.count(Table::Feature).unwrap(), 131);
        assert_eq!(reader.count(Table::Diagram).unwrap(), 1);
        assert!(reader.count(Table::Void).is_err());
    }

    #[test]
    fn test_closed_database_reads_fail() {
        let db = Database::closed();
        assert!(matches!(
            db.reader().diagram(RowId::new(1)),
            Err(FacetError::NoDatabase)
        ));
        assert!(matches!(
            db.reader().features_of_classifier(RowId::new(1)),
            Err(FacetError::NoDatabase)
        ));
    }
}
