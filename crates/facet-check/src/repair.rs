//! Repair actions for scan violations

use crate::types::{CheckKind, OptionalReferencePolicy};
use facet_core::{FacetError, RelationshipSide, Result, RowId, RowRef};
use facet_store::Database;
use log::debug;
use rusqlite::OptionalExtension;
use std::fmt;

/// A single write that repairs (part of) a violation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepairAction {
    /// Delete the row
    DeleteRow(RowRef),
    /// Set a diagram element's focused feature to void
    ClearFocusedFeature(RowId),
    /// Set one feature end of a relationship to void
    ClearRelationshipFeature {
        relationship: RowId,
        side: RelationshipSide,
    },
    /// Point a diagram at a new parent; a void parent promotes it to root
    Reparent { diagram: RowId, parent: RowId },
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairAction::DeleteRow(row_ref) => write!(f, "delete {}", row_ref),
            RepairAction::ClearFocusedFeature(id) => {
                write!(f, "clear focused feature of E{}", id)
            }
            RepairAction::ClearRelationshipFeature { relationship, side } => {
                let end = match side {
                    RelationshipSide::From => "from",
                    RelationshipSide::To => "to",
                };
                write!(f, "clear {}-feature of R{}", end, relationship)
            }
            RepairAction::Reparent { diagram, parent } if parent.is_void() => {
                write!(f, "promote D{} to root", diagram)
            }
            RepairAction::Reparent { diagram, parent } => {
                write!(f, "move D{} below D{}", diagram, parent)
            }
        }
    }
}

/// Plans and applies repairs, one transaction per action
pub struct Repairer<'a> {
    db: &'a Database,
    policy: OptionalReferencePolicy,
}

impl<'a> Repairer<'a> {
    pub fn new(db: &'a Database, policy: OptionalReferencePolicy) -> Self {
        Self { db, policy }
    }

    /// Plan and apply the repair of one violation reported by `kind`.
    ///
    /// Returns the actions applied. An empty list means the violation no
    /// longer exists.
    pub fn repair(&self, kind: CheckKind, violation: RowRef) -> Result<Vec<RepairAction>> {
        let actions = self.plan(kind, violation)?;
        for action in &actions {
            self.apply(*action)?;
        }
        Ok(actions)
    }

    /// Decide which actions repair a violation
    pub fn plan(&self, kind: CheckKind, violation: RowRef) -> Result<Vec<RepairAction>> {
        if !violation.is_valid() || violation.table != kind.table() {
            return Err(FacetError::InvalidRequest(format!(
                "{} cannot be repaired by the {} check",
                violation,
                kind.description()
            )));
        }

        let actions = match kind {
            CheckKind::SingleRootDiagram => {
                let parent = match self.lowest_root()? {
                    Some(root) if root != violation.row_id => root,
                    _ => RowId::VOID,
                };
                vec![RepairAction::Reparent {
                    diagram: violation.row_id,
                    parent,
                }]
            }
            CheckKind::DiagramElementFocusedFeatures
                if self.policy == OptionalReferencePolicy::Clear =>
            {
                vec![RepairAction::ClearFocusedFeature(violation.row_id)]
            }
            CheckKind::RelationshipFeatures if self.policy == OptionalReferencePolicy::Clear => {
                self.broken_relationship_sides(violation.row_id)?
                    .into_iter()
                    .map(|side| RepairAction::ClearRelationshipFeature {
                        relationship: violation.row_id,
                        side,
                    })
                    .collect()
            }
            _ => vec![RepairAction::DeleteRow(violation)],
        };
        debug!("Planned repair of {}: {:?}", violation, actions);
        Ok(actions)
    }

    /// Execute one action in its own transaction
    pub fn apply(&self, action: RepairAction) -> Result<()> {
        let writer = self.db.writer();
        match action {
            RepairAction::DeleteRow(row_ref) => writer.delete_row(row_ref)?,
            RepairAction::ClearFocusedFeature(id) => writer.clear_focused_feature(id)?,
            RepairAction::ClearRelationshipFeature { relationship, side } => {
                writer.clear_relationship_feature(relationship, side)?
            }
            RepairAction::Reparent { diagram, parent } => {
                writer.set_diagram_parent(diagram, parent)?
            }
        };
        debug!("Applied: {}", action);
        Ok(())
    }

    /// The root diagram kept by the single-root repair
    fn lowest_root(&self) -> Result<Option<RowId>> {
        let id: Option<i64> = self
            .db
            .connection()?
            .query_row(
                "SELECT MIN(id) FROM diagrams WHERE parent_id IS NULL",
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        Ok(id.map(RowId::new))
    }

    /// Sides of a relationship whose feature is missing or owned by the
    /// wrong classifier
    fn broken_relationship_sides(&self, id: RowId) -> Result<Vec<RelationshipSide>> {
        let reader = self.db.reader();
        let relationship = match reader.relationship(id) {
            Ok(relationship) => relationship,
            Err(FacetError::NotFound(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        let mut broken = Vec::new();
        for side in [RelationshipSide::From, RelationshipSide::To] {
            let feature_id = relationship.feature_id(side);
            if feature_id.is_void() {
                continue;
            }
            match reader.feature(feature_id) {
                Ok(feature) if feature.classifier_id == relationship.classifier_id(side) => {}
                Ok(_) | Err(FacetError::NotFound(_)) => broken.push(side),
                Err(err) => return Err(err),
            }
        }
        Ok(broken)
    }
}
