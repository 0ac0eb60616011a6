//! Bounded set of row references

use crate::error::{FacetError, Result};
use crate::id::RowRef;

/// A small, insertion-ordered set of valid row references.
///
/// The set refuses to grow past its capacity limit instead of silently
/// dropping entries.
#[derive(Debug, Clone)]
pub struct RefSet {
    refs: Vec<RowRef>,
    limit: usize,
}

impl Default for RefSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RefSet {
    pub const DEFAULT_CAPACITY: usize = 128;

    /// Create an empty set with the default capacity
    pub fn new() -> Self {
        Self::with_capacity_limit(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty set holding at most `limit` references
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            refs: Vec::new(),
            limit,
        }
    }

    pub fn capacity_limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn contains(&self, row_ref: RowRef) -> bool {
        self.refs.iter().any(|r| *r == row_ref)
    }

    /// Add a reference
    ///
    /// Fails with `InvalidRequest` for a void reference, `DuplicateId` if the
    /// reference is already present and `ArrayBufferExceeded` when full.
    pub fn add(&mut self, row_ref: RowRef) -> Result<()> {
        if !row_ref.is_valid() {
            return Err(FacetError::InvalidRequest(
                "cannot add a void reference".to_string(),
            ));
        }
        if self.contains(row_ref) {
            return Err(FacetError::DuplicateId(row_ref));
        }
        if self.refs.len() >= self.limit {
            return Err(FacetError::ArrayBufferExceeded { limit: self.limit });
        }
        self.refs.push(row_ref);
        Ok(())
    }

    /// Remove a reference, failing with `InvalidRequest` if it is absent
    pub fn delete(&mut self, row_ref: RowRef) -> Result<()> {
        match self.refs.iter().position(|r| *r == row_ref) {
            Some(index) => {
                self.refs.remove(index);
                Ok(())
            }
            None => Err(FacetError::InvalidRequest(format!(
                "{} is not in the set",
                row_ref
            ))),
        }
    }

    /// Add the reference if absent, delete it if present
    pub fn toggle(&mut self, row_ref: RowRef) -> Result<()> {
        if self.contains(row_ref) {
            self.delete(row_ref)
        } else {
            self.add(row_ref)
        }
    }

    pub fn clear(&mut self) {
        self.refs.clear();
    }

    pub fn get(&self, index: usize) -> Option<RowRef> {
        self.refs.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef> + '_ {
        self.refs.iter().copied()
    }
}

impl<'a> IntoIterator for &'a RefSet {
    type Item = RowRef;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, RowRef>>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{RowId, Table};

    #[test]
    fn test_add_and_contains() {
        let mut set = RefSet::new();
        set.add(RowRef::diagram(1)).unwrap();
        set.add(RowRef::classifier(1)).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains(RowRef::diagram(1)));
        assert!(set.contains(RowRef::classifier(1)));
        assert!(!set.contains(RowRef::feature(1)));
        assert_eq!(set.get(1), Some(RowRef::classifier(1)));
    }

    #[test]
    fn test_add_duplicate() {
        let mut set = RefSet::new();
        set.add(RowRef::feature(3)).unwrap();
        let err = set.add(RowRef::feature(3)).unwrap_err();
        assert!(matches!(err, FacetError::DuplicateId(r) if r == RowRef::feature(3)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_void() {
        let mut set = RefSet::new();
        assert!(matches!(
            set.add(RowRef::VOID),
            Err(FacetError::InvalidRequest(_))
        ));
        assert!(matches!(
            set.add(RowRef::new(Table::Diagram, RowId::VOID)),
            Err(FacetError::InvalidRequest(_))
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_capacity_limit() {
        let mut set = RefSet::with_capacity_limit(2);
        set.add(RowRef::diagram(1)).unwrap();
        set.add(RowRef::diagram(2)).unwrap();
        let err = set.add(RowRef::diagram(3)).unwrap_err();
        assert!(matches!(err, FacetError::ArrayBufferExceeded { limit: 2 }));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_delete() {
        let mut set = RefSet::new();
        set.add(RowRef::relationship(5)).unwrap();
        set.delete(RowRef::relationship(5)).unwrap();
        assert!(set.is_empty());
        assert!(matches!(
            set.delete(RowRef::relationship(5)),
            Err(FacetError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_toggle() {
        let mut set = RefSet::with_capacity_limit(1);
        set.toggle(RowRef::diagram_element(8)).unwrap();
        assert!(set.contains(RowRef::diagram_element(8)));

        // Full: toggling a new reference propagates the add failure
        assert!(matches!(
            set.toggle(RowRef::diagram_element(9)),
            Err(FacetError::ArrayBufferExceeded { .. })
        ));

        set.toggle(RowRef::diagram_element(8)).unwrap();
        assert!(set.is_empty());
        assert!(set.toggle(RowRef::VOID).is_err());
    }

    #[test]
    fn test_clear_and_iter() {
        let mut set = RefSet::new();
        set.add(RowRef::diagram(2)).unwrap();
        set.add(RowRef::diagram(1)).unwrap();

        let order: Vec<RowRef> = set.iter().collect();
        assert_eq!(order, vec![RowRef::diagram(2), RowRef::diagram(1)]);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity_limit(), RefSet::DEFAULT_CAPACITY);
    }
}
