//! Schema models
//!
//! Column definitions, table snapshots and the model files they come from.

pub mod column;
pub mod model;
pub mod schema;

pub use column::{ColumnDefinition, Columns, DefaultValue};
pub use model::{Association, DatabaseKind, IndexDefinition, ModelConfig};
pub use schema::{default_table_name, TableSchema};
