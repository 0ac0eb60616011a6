//! Check and status type definitions

use facet_core::{FacetError, Table};
use serde::{Deserialize, Serialize};

/// One consistency check of the repair pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Exactly one diagram has a void parent
    SingleRootDiagram,
    /// Every parent chain reaches the root without cycles
    DiagramParents,
    /// Diagram elements point at existing diagrams and classifiers
    DiagramElementReferences,
    /// Focused features exist and belong to the element's classifier
    DiagramElementFocusedFeatures,
    /// Features belong to existing classifiers
    FeatureClassifiers,
    /// Relationships connect existing classifiers
    RelationshipClassifiers,
    /// Relationship features exist and belong to the same-side classifier
    RelationshipFeatures,
    /// Every classifier is shown in at least one diagram
    UnreferencedClassifiers,
}

impl CheckKind {
    /// The fixed order of a repair pass.
    ///
    /// Diagram structure comes first, dangling references next, and the
    /// unreferenced classifier sweep last.
    pub const ORDERED: [CheckKind; 8] = [
        CheckKind::SingleRootDiagram,
        CheckKind::DiagramParents,
        CheckKind::DiagramElementReferences,
        CheckKind::DiagramElementFocusedFeatures,
        CheckKind::FeatureClassifiers,
        CheckKind::RelationshipClassifiers,
        CheckKind::RelationshipFeatures,
        CheckKind::UnreferencedClassifiers,
    ];

    /// Checks re-run after classifiers were deleted in the same pass
    pub const CASCADE_SWEEP: [CheckKind; 3] = [
        CheckKind::FeatureClassifiers,
        CheckKind::RelationshipClassifiers,
        CheckKind::RelationshipFeatures,
    ];

    /// The table holding the rows this check reports
    pub fn table(&self) -> Table {
        match self {
            CheckKind::SingleRootDiagram | CheckKind::DiagramParents => Table::Diagram,
            CheckKind::DiagramElementReferences | CheckKind::DiagramElementFocusedFeatures => {
                Table::DiagramElement
            }
            CheckKind::FeatureClassifiers => Table::Feature,
            CheckKind::RelationshipClassifiers | CheckKind::RelationshipFeatures => {
                Table::Relationship
            }
            CheckKind::UnreferencedClassifiers => Table::Classifier,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CheckKind::SingleRootDiagram => "single root diagram",
            CheckKind::DiagramParents => "diagram parent chains",
            CheckKind::DiagramElementReferences => "diagram element references",
            CheckKind::DiagramElementFocusedFeatures => "diagram element focused features",
            CheckKind::FeatureClassifiers => "feature owners",
            CheckKind::RelationshipClassifiers => "relationship classifiers",
            CheckKind::RelationshipFeatures => "relationship features",
            CheckKind::UnreferencedClassifiers => "unreferenced classifiers",
        }
    }
}

/// How a broken optional feature reference is repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalReferencePolicy {
    /// Delete the diagram element or relationship holding the reference
    #[default]
    Delete,
    /// Set the broken reference to void and keep the row
    Clear,
}

/// Overall outcome of a repair pass.
///
/// Variants are ordered by severity so statuses combine with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    #[default]
    None,
    DbStructure,
    ReadOnlyDb,
    AtDb,
    NoDb,
}

impl RepairStatus {
    /// Combine two statuses, keeping the more severe
    pub fn combine(self, other: RepairStatus) -> RepairStatus {
        self.max(other)
    }

    pub fn is_success(&self) -> bool {
        *self == RepairStatus::None
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            RepairStatus::None => 0,
            RepairStatus::DbStructure => 1,
            RepairStatus::NoDb => 2,
            RepairStatus::ReadOnlyDb => 3,
            RepairStatus::AtDb => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepairStatus::None => "NONE",
            RepairStatus::DbStructure => "DB_STRUCTURE",
            RepairStatus::ReadOnlyDb => "READ_ONLY_DB",
            RepairStatus::AtDb => "AT_DB",
            RepairStatus::NoDb => "NO_DB",
        }
    }
}

impl From<&FacetError> for RepairStatus {
    fn from(err: &FacetError) -> Self {
        match err {
            FacetError::NoDatabase => RepairStatus::NoDb,
            FacetError::ReadOnlyDb => RepairStatus::ReadOnlyDb,
            err if err.is_store_error() => RepairStatus::AtDb,
            _ => RepairStatus::DbStructure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_checks_end_with_classifier_sweep() {
        assert_eq!(CheckKind::ORDERED[0], CheckKind::SingleRootDiagram);
        assert_eq!(CheckKind::ORDERED[1], CheckKind::DiagramParents);
        assert_eq!(CheckKind::ORDERED[7], CheckKind::UnreferencedClassifiers);
        assert!(CheckKind::CASCADE_SWEEP
            .iter()
            .all(|k| CheckKind::ORDERED.contains(k)));
    }

    #[test]
    fn test_check_tables() {
        assert_eq!(CheckKind::DiagramParents.table(), Table::Diagram);
        assert_eq!(CheckKind::DiagramElementFocusedFeatures.table(), Table::DiagramElement);
        assert_eq!(CheckKind::FeatureClassifiers.table(), Table::Feature);
        assert_eq!(CheckKind::RelationshipFeatures.table(), Table::Relationship);
        assert_eq!(CheckKind::UnreferencedClassifiers.table(), Table::Classifier);
    }

    #[test]
    fn test_status_combination_is_monotonic() {
        let status = RepairStatus::None
            .combine(RepairStatus::DbStructure)
            .combine(RepairStatus::None);
        assert_eq!(status, RepairStatus::DbStructure);
        assert_eq!(
            RepairStatus::ReadOnlyDb.combine(RepairStatus::DbStructure),
            RepairStatus::ReadOnlyDb
        );
        assert_eq!(RepairStatus::AtDb.combine(RepairStatus::ReadOnlyDb), RepairStatus::AtDb);
    }

    #[test]
    fn test_status_from_error() {
        assert_eq!(RepairStatus::from(&FacetError::ReadOnlyDb), RepairStatus::ReadOnlyDb);
        assert_eq!(RepairStatus::from(&FacetError::NoDatabase), RepairStatus::NoDb);
        assert_eq!(
            RepairStatus::from(&FacetError::ArrayBufferExceeded { limit: 8 }),
            RepairStatus::AtDb
        );
        assert_eq!(
            RepairStatus::from(&FacetError::InvalidRequest("x".to_string())),
            RepairStatus::DbStructure
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RepairStatus::None.exit_code(), 0);
        assert_eq!(RepairStatus::DbStructure.exit_code(), 1);
        assert_eq!(RepairStatus::NoDb.exit_code(), 2);
        assert!(RepairStatus::None.is_success());
        assert!(!RepairStatus::AtDb.is_success());
    }

    #[test]
    fn test_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: OptionalReferencePolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"clear\"").unwrap();
        assert_eq!(w.policy, OptionalReferencePolicy::Clear);
        assert_eq!(OptionalReferencePolicy::default(), OptionalReferencePolicy::Delete);
    }
}
