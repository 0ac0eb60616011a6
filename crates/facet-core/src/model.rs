//! Model rows as persisted in the relational store

use crate::id::RowId;
use serde::{Deserialize, Serialize};

/// A diagram; a void `parent_id` marks the root
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: RowId,
    pub parent_id: RowId,
    pub diagram_type: i32,
    pub stereotype: String,
    pub name: String,
    pub description: String,
    pub list_order: i32,
    pub display_flags: i64,
    pub uuid: String,
}

impl Diagram {
    pub fn new(id: i64, parent_id: RowId, name: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            parent_id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_void()
    }
}

/// A classifier; names are unique across the model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    pub id: RowId,
    pub main_type: i32,
    pub stereotype: String,
    pub name: String,
    pub description: String,
    pub x_order: i32,
    pub y_order: i32,
    pub list_order: i32,
    pub uuid: String,
}

impl Classifier {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A feature (property, operation, port, lifeline, ...) owned by a classifier
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: RowId,
    pub main_type: i32,
    pub classifier_id: RowId,
    pub key: String,
    pub value: String,
    pub description: String,
    pub list_order: i32,
    pub uuid: String,
}

impl Feature {
    pub fn new(id: i64, classifier_id: i64, key: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            classifier_id: RowId::new(classifier_id),
            key: key.into(),
            ..Default::default()
        }
    }
}

/// Which end of a relationship a reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipSide {
    From,
    To,
}

/// A relationship between two classifiers, optionally anchored at features
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RowId,
    pub main_type: i32,
    pub from_classifier_id: RowId,
    pub to_classifier_id: RowId,
    pub from_feature_id: RowId,
    pub to_feature_id: RowId,
    pub name: String,
    pub description: String,
    pub list_order: i32,
    pub uuid: String,
}

impl Relationship {
    pub fn new(id: i64, from_classifier_id: i64, to_classifier_id: i64) -> Self {
        Self {
            id: RowId::new(id),
            from_classifier_id: RowId::new(from_classifier_id),
            to_classifier_id: RowId::new(to_classifier_id),
            from_feature_id: RowId::VOID,
            to_feature_id: RowId::VOID,
            ..Default::default()
        }
    }

    pub fn with_features(mut self, from_feature_id: RowId, to_feature_id: RowId) -> Self {
        self.from_feature_id = from_feature_id;
        self.to_feature_id = to_feature_id;
        self
    }

    pub fn classifier_id(&self, side: RelationshipSide) -> RowId {
        match side {
            RelationshipSide::From => self.from_classifier_id,
            RelationshipSide::To => self.to_classifier_id,
        }
    }

    pub fn feature_id(&self, side: RelationshipSide) -> RowId {
        match side {
            RelationshipSide::From => self.from_feature_id,
            RelationshipSide::To => self.to_feature_id,
        }
    }
}

/// The occurrence of a classifier inside a diagram
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    pub id: RowId,
    pub diagram_id: RowId,
    pub classifier_id: RowId,
    pub display_flags: i64,
    pub focused_feature_id: RowId,
    pub uuid: String,
}

impl DiagramElement {
    pub fn new(id: i64, diagram_id: i64, classifier_id: i64) -> Self {
        Self {
            id: RowId::new(id),
            diagram_id: RowId::new(diagram_id),
            classifier_id: RowId::new(classifier_id),
            focused_feature_id: RowId::VOID,
            ..Default::default()
        }
    }

    pub fn with_focused_feature(mut self, feature_id: RowId) -> Self {
        self.focused_feature_id = feature_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_diagram() {
        assert!(Diagram::new(1, RowId::VOID, "root").is_root());
        assert!(!Diagram::new(2, RowId::new(1), "child").is_root());
    }

    #[test]
    fn test_relationship_sides() {
        let rel = Relationship::new(1, 10, 20).with_features(RowId::new(100), RowId::VOID);
        assert_eq!(rel.classifier_id(RelationshipSide::From), RowId::new(10));
        assert_eq!(rel.classifier_id(RelationshipSide::To), RowId::new(20));
        assert_eq!(rel.feature_id(RelationshipSide::From), RowId::new(100));
        assert!(rel.feature_id(RelationshipSide::To).is_void());
    }

    #[test]
    fn test_defaults_use_void_references() {
        let element = DiagramElement::new(1, 2, 3);
        assert!(element.focused_feature_id.is_void());
        assert!(Diagram::default().id.is_void());
    }
}
