//! Facet Core - Foundational types for the Facet model checker
//!
//! This crate provides the types that all other Facet crates depend on:
//! - `RowId`, `Table`, `RowRef` - Typed row references with void semantics
//! - `RefSet` - Bounded set of row references, the output of every scan
//! - `Diagram`, `Classifier`, `Feature`, `Relationship`, `DiagramElement` - Model rows
//! - Error types and Result alias

mod error;
mod id;
mod model;
mod set;

pub use error::{FacetError, Result};
pub use id::{RowId, RowRef, Table};
pub use model::{Classifier, Diagram, DiagramElement, Feature, Relationship, RelationshipSide};
pub use set::RefSet;
