//! Schema Snapshot Module
//!
//! Detecting what changed between two versions of a model:
//! - Model store (the persisted snapshots)
//! - Schema diff engine (comparing snapshots column by column)

pub mod diff;
pub mod store;

pub use diff::{ChangeType, ColumnDelta, DiffEngine, DiffSummary, SchemaDiff};
pub use store::ModelStore;
