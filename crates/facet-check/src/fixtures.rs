//! Model databases shared by the unit tests

use facet_core::{Classifier, Diagram, DiagramElement, Feature, Relationship, RowId};
use facet_store::Database;

pub fn empty() -> Database {
    Database::open_in_memory().unwrap()
}

pub fn diagram(db: &Database, id: i64, parent: Option<i64>) {
    db.writer()
        .create_diagram(&Diagram::new(id, RowId::from(parent), format!("diagram {}", id)))
        .unwrap();
}

pub fn classifier(db: &Database, id: i64) {
    db.writer()
        .create_classifier(&Classifier::new(id, format!("classifier {}", id)))
        .unwrap();
}

pub fn feature(db: &Database, id: i64, classifier_id: i64) {
    db.writer()
        .create_feature(&Feature::new(id, classifier_id, format!("feature {}", id)))
        .unwrap();
}

pub fn element(db: &Database, id: i64, diagram_id: i64, classifier_id: i64) {
    db.writer()
        .create_diagram_element(&DiagramElement::new(id, diagram_id, classifier_id))
        .unwrap();
}

pub fn focused_element(db: &Database, id: i64, diagram_id: i64, classifier_id: i64, feature_id: i64) {
    db.writer()
        .create_diagram_element(
            &DiagramElement::new(id, diagram_id, classifier_id)
                .with_focused_feature(RowId::new(feature_id)),
        )
        .unwrap();
}

pub fn relationship(db: &Database, id: i64, from: i64, to: i64) {
    db.writer()
        .create_relationship(&Relationship::new(id, from, to))
        .unwrap();
}

pub fn feature_relationship(
    db: &Database,
    id: i64,
    from: (i64, Option<i64>),
    to: (i64, Option<i64>),
) {
    db.writer()
        .create_relationship(
            &Relationship::new(id, from.0, to.0)
                .with_features(RowId::from(from.1), RowId::from(to.1)),
        )
        .unwrap();
}

/// A small model without any violation:
///
/// - diagrams 1 (root) and 2 (child of 1)
/// - classifiers 10 and 11, shown by elements 20 and 21
/// - features 100 (of 10) and 101 (of 11)
/// - relationship 30 from 10/100 to 11/101
pub fn consistent() -> Database {
    let db = empty();
    diagram(&db, 1, None);
    diagram(&db, 2, Some(1));
    classifier(&db, 10);
    classifier(&db, 11);
    feature(&db, 100, 10);
    feature(&db, 101, 11);
    focused_element(&db, 20, 1, 10, 100);
    element(&db, 21, 2, 11);
    feature_relationship(&db, 30, (10, Some(100)), (11, Some(101)));
    db
}
