//! Relational scan queries
//!
//! Every scan issues one outer-join query, classifies the returned rows and
//! reports the offending rows as a [`RefSet`]. Scans never write.

use crate::types::CheckKind;
use facet_core::{FacetError, RefSet, Result, RowId, RowRef, Table};
use facet_store::Database;
use log::debug;
use rusqlite::Row;
use std::collections::HashMap;

/// Runs the read-only consistency scans against a database
pub struct ConsistencyScanner<'a> {
    db: &'a Database,
    max_rows: usize,
}

impl<'a> ConsistencyScanner<'a> {
    /// Create a scanner examining at most `max_rows` rows per scan
    pub fn new(db: &'a Database, max_rows: usize) -> Self {
        Self { db, max_rows }
    }

    /// Run the scan belonging to a check
    pub fn scan(&self, kind: CheckKind) -> Result<RefSet> {
        match kind {
            CheckKind::SingleRootDiagram => self.find_root_violations(),
            CheckKind::DiagramParents => self.find_unreferenced_diagrams(),
            CheckKind::DiagramElementReferences => self.find_invalid_diagram_elements(),
            CheckKind::DiagramElementFocusedFeatures => self.find_invalid_focused_features(),
            CheckKind::FeatureClassifiers => self.find_unreferenced_features(),
            CheckKind::RelationshipClassifiers => self.find_invalid_relationship_classifiers(),
            CheckKind::RelationshipFeatures => self.find_invalid_relationship_features(),
            CheckKind::UnreferencedClassifiers => self.find_unreferenced_classifiers(),
        }
    }

    /// Diagrams violating the single-root rule.
    ///
    /// With several roots every root except the lowest id is reported. With
    /// no root at all the lowest-id diagram is reported as the candidate for
    /// promotion. An empty diagram table has nothing to report.
    pub fn find_root_violations(&self) -> Result<RefSet> {
        let links = self.diagram_links()?;
        let mut violations = self.new_set();

        let roots: Vec<RowId> = links
            .iter()
            .filter(|(_, parent)| parent.is_void())
            .map(|(id, _)| *id)
            .collect();
        debug!("Found {} root diagram(s)", roots.len());

        match roots.split_first() {
            Some((_, extra_roots)) => {
                for id in extra_roots {
                    violations.add(RowRef::new(Table::Diagram, *id))?;
                }
            }
            None => {
                if let Some((lowest, _)) = links.first() {
                    violations.add(RowRef::new(Table::Diagram, *lowest))?;
                }
            }
        }
        Ok(violations)
    }

    /// Diagrams whose parent chain never reaches a root: a missing parent,
    /// a cycle, or a chain hanging off either.
    pub fn find_unreferenced_diagrams(&self) -> Result<RefSet> {
        let links = self.diagram_links()?;
        let index: HashMap<RowId, usize> = links
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (*id, i))
            .collect();

        // A diagram whose parent has a void parent is linked to a root: clear
        // its own link. Repeat until nothing changes; N rounds always suffice.
        let mut parents: Vec<RowId> = links.iter().map(|(_, parent)| *parent).collect();
        for round in 0..parents.len() {
            let mut changed = false;
            for i in 0..parents.len() {
                let parent = parents[i];
                if parent.is_void() {
                    continue;
                }
                if let Some(&p) = index.get(&parent) {
                    if parents[p].is_void() {
                        parents[i] = RowId::VOID;
                        changed = true;
                    }
                }
            }
            if !changed {
                debug!("Diagram links reached a fixed point after {} round(s)", round + 1);
                break;
            }
        }

        let mut violations = self.new_set();
        for ((id, original_parent), parent) in links.iter().zip(&parents) {
            if parent.is_valid() {
                debug!(
                    "Diagram {} is not linked to a root (parent {})",
                    id, original_parent
                );
                violations.add(RowRef::new(Table::Diagram, *id))?;
            }
        }
        Ok(violations)
    }

    /// Diagram elements referencing a missing diagram and/or classifier
    pub fn find_invalid_diagram_elements(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT diagramelements.id, diagrams.id, classifiers.id \
             FROM diagramelements \
             LEFT JOIN diagrams ON diagramelements.diagram_id = diagrams.id \
             LEFT JOIN classifiers ON diagramelements.classifier_id = classifiers.id \
             ORDER BY diagramelements.id ASC",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        )?;

        let mut violations = self.new_set();
        for (id, diagram, classifier) in rows {
            if diagram.is_none() || classifier.is_none() {
                debug!(
                    "Diagram element {} has diagram {:?} and classifier {:?}",
                    id, diagram, classifier
                );
                violations.add(RowRef::diagram_element(id))?;
            }
        }
        Ok(violations)
    }

    /// Diagram elements whose focused feature is missing or owned by another classifier
    pub fn find_invalid_focused_features(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT diagramelements.id, diagramelements.classifier_id, \
             diagramelements.focused_feature_id, features.id, features.classifier_id \
             FROM diagramelements \
             LEFT JOIN features ON diagramelements.focused_feature_id = features.id \
             ORDER BY diagramelements.id ASC",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    FeatureLink {
                        expected_owner: RowId::new(row.get(1)?),
                        feature_id: RowId::from(row.get::<_, Option<i64>>(2)?),
                        found_id: row.get(3)?,
                        found_owner: row.get(4)?,
                    },
                ))
            },
        )?;

        let mut violations = self.new_set();
        for (id, link) in rows {
            if link.is_broken() {
                debug!("Diagram element {} has a broken focused feature {}", id, link.feature_id);
                violations.add(RowRef::diagram_element(id))?;
            }
        }
        Ok(violations)
    }

    /// Classifiers not shown by any diagram element
    pub fn find_unreferenced_classifiers(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT classifiers.id, COUNT(diagramelements.id) \
             FROM classifiers \
             LEFT JOIN diagramelements ON diagramelements.classifier_id = classifiers.id \
             GROUP BY classifiers.id \
             ORDER BY classifiers.id ASC",
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        let mut violations = self.new_set();
        for (id, references) in rows {
            if references == 0 {
                violations.add(RowRef::classifier(id))?;
            }
        }
        Ok(violations)
    }

    /// Features whose owning classifier is missing
    pub fn find_unreferenced_features(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT features.id, classifiers.id \
             FROM features \
             LEFT JOIN classifiers ON features.classifier_id = classifiers.id \
             ORDER BY features.id ASC",
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)),
        )?;

        let mut violations = self.new_set();
        for (id, owner) in rows {
            if owner.is_none() {
                violations.add(RowRef::feature(id))?;
            }
        }
        Ok(violations)
    }

    /// Relationships whose source and/or destination classifier is missing
    pub fn find_invalid_relationship_classifiers(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT relationships.id, source.id, dest.id \
             FROM relationships \
             LEFT JOIN classifiers AS source ON relationships.from_classifier_id = source.id \
             LEFT JOIN classifiers AS dest ON relationships.to_classifier_id = dest.id \
             ORDER BY relationships.id ASC",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        )?;

        let mut violations = self.new_set();
        for (id, source, dest) in rows {
            if source.is_none() || dest.is_none() {
                debug!(
                    "Relationship {} has source {:?} and destination {:?}",
                    id, source, dest
                );
                violations.add(RowRef::relationship(id))?;
            }
        }
        Ok(violations)
    }

    /// Relationships with a broken from- or to-feature reference
    pub fn find_invalid_relationship_features(&self) -> Result<RefSet> {
        let rows = self.collect_rows(
            "SELECT relationships.id, \
             relationships.from_classifier_id, relationships.from_feature_id, \
             source.id, source.classifier_id, \
             relationships.to_classifier_id, relationships.to_feature_id, \
             dest.id, dest.classifier_id \
             FROM relationships \
             LEFT JOIN features AS source ON relationships.from_feature_id = source.id \
             LEFT JOIN features AS dest ON relationships.to_feature_id = dest.id \
             ORDER BY relationships.id ASC",
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    FeatureLink {
                        expected_owner: RowId::new(row.get(1)?),
                        feature_id: RowId::from(row.get::<_, Option<i64>>(2)?),
                        found_id: row.get(3)?,
                        found_owner: row.get(4)?,
                    },
                    FeatureLink {
                        expected_owner: RowId::new(row.get(5)?),
                        feature_id: RowId::from(row.get::<_, Option<i64>>(6)?),
                        found_id: row.get(7)?,
                        found_owner: row.get(8)?,
                    },
                ))
            },
        )?;

        let mut violations = self.new_set();
        for (id, from, to) in rows {
            if from.is_broken() || to.is_broken() {
                debug!(
                    "Relationship {} has broken features (from {}: {}, to {}: {})",
                    id,
                    from.feature_id,
                    from.is_broken(),
                    to.feature_id,
                    to.is_broken()
                );
                violations.add(RowRef::relationship(id))?;
            }
        }
        Ok(violations)
    }

    /// (id, parent) of every diagram, ordered by id
    fn diagram_links(&self) -> Result<Vec<(RowId, RowId)>> {
        self.collect_rows(
            "SELECT id, parent_id FROM diagrams ORDER BY id ASC",
            |row| {
                Ok((
                    RowId::new(row.get(0)?),
                    RowId::from(row.get::<_, Option<i64>>(1)?),
                ))
            },
        )
    }

    fn new_set(&self) -> RefSet {
        RefSet::with_capacity_limit(self.max_rows)
    }

    /// Run a query, failing instead of truncating when it yields more rows
    /// than the ceiling
    fn collect_rows<T>(
        &self,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?;

        let mut collected = Vec::new();
        for row in rows {
            if collected.len() >= self.max_rows {
                return Err(FacetError::ArrayBufferExceeded {
                    limit: self.max_rows,
                });
            }
            collected.push(row?);
        }
        Ok(collected)
    }
}

/// An optional feature reference joined against the features table
struct FeatureLink {
    expected_owner: RowId,
    feature_id: RowId,
    found_id: Option<i64>,
    found_owner: Option<i64>,
}

impl FeatureLink {
    /// A void reference is never broken; a present one must resolve to a
    /// feature owned by the expected classifier.
    fn is_broken(&self) -> bool {
        if self.feature_id.is_void() {
            return false;
        }
        match (self.found_id, self.found_owner) {
            (Some(_), Some(owner)) => RowId::new(owner) != self.expected_owner,
            _ => true,
        }
    }
}
