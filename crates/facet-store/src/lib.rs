//! Facet Store - SQLite persistence for the diagram model
//!
//! This crate opens model databases, migrates their schema and provides the
//! row-level reader and writer the consistency checker works through.

mod database;
mod reader;
mod schema;
mod writer;

pub use database::Database;
pub use reader::{FeatureIter, Reader};
pub use schema::SCHEMA_VERSION;
pub use writer::Writer;
