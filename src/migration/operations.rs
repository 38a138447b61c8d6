//! Migration operations
//!
//! The structural steps a migration performs through the query interface.
//! Operations hold full column definitions; text is produced by the renderer.

use crate::models::{ColumnDefinition, Columns, IndexDefinition};
use serde::Serialize;

/// One query-interface call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum MigrationOp {
    /// Create a table with its declared columns
    CreateTable(CreateTableOp),
    /// Drop a table
    DropTable(DropTableOp),
    /// Rename a table
    RenameTable(RenameTableOp),
    /// Add a column to a table
    AddColumn(AddColumnOp),
    /// Remove a column
    RemoveColumn(RemoveColumnOp),
    /// Replace a column's definition
    ChangeColumn(ChangeColumnOp),
    /// Add a secondary index
    AddIndex(AddIndexOp),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableOp {
    pub table_name: String,
    pub columns: Columns,
    /// Adds `createdAt`/`updatedAt` columns next to the declared ones
    pub timestamps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTableOp {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTableOp {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumnOp {
    pub table_name: String,
    pub column_name: String,
    pub definition: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveColumnOp {
    pub table_name: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeColumnOp {
    pub table_name: String,
    pub column_name: String,
    pub definition: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIndexOp {
    pub table_name: String,
    pub index: IndexDefinition,
}

impl MigrationOp {
    pub fn rename_table(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        MigrationOp::RenameTable(RenameTableOp {
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    pub fn add_column(table: &str, column: &str, definition: &ColumnDefinition) -> Self {
        MigrationOp::AddColumn(AddColumnOp {
            table_name: table.to_string(),
            column_name: column.to_string(),
            definition: definition.clone(),
        })
    }

    pub fn remove_column(table: &str, column: &str) -> Self {
        MigrationOp::RemoveColumn(RemoveColumnOp {
            table_name: table.to_string(),
            column_name: column.to_string(),
        })
    }

    pub fn change_column(table: &str, column: &str, definition: &ColumnDefinition) -> Self {
        MigrationOp::ChangeColumn(ChangeColumnOp {
            table_name: table.to_string(),
            column_name: column.to_string(),
            definition: definition.clone(),
        })
    }

    /// Name of the query-interface method this operation calls
    pub fn method(&self) -> &'static str {
        match self {
            MigrationOp::CreateTable(_) => "createTable",
            MigrationOp::DropTable(_) => "dropTable",
            MigrationOp::RenameTable(_) => "renameTable",
            MigrationOp::AddColumn(_) => "addColumn",
            MigrationOp::RemoveColumn(_) => "removeColumn",
            MigrationOp::ChangeColumn(_) => "changeColumn",
            MigrationOp::AddIndex(_) => "addIndex",
        }
    }

    /// Get a human-readable description of the operation
    pub fn description(&self) -> String {
        match self {
            MigrationOp::CreateTable(c) => {
                format!("Create table {} with {} columns", c.table_name, c.columns.len())
            }
            MigrationOp::DropTable(c) => format!("Drop table {}", c.table_name),
            MigrationOp::RenameTable(c) => format!("Rename table {} to {}", c.old_name, c.new_name),
            MigrationOp::AddColumn(c) => {
                format!("Add column {} ({}) to {}", c.column_name, c.definition.data_type, c.table_name)
            }
            MigrationOp::RemoveColumn(c) => format!("Remove column {} from {}", c.column_name, c.table_name),
            MigrationOp::ChangeColumn(c) => {
                format!("Change column {} in {} to {}", c.column_name, c.table_name, c.definition.data_type)
            }
            MigrationOp::AddIndex(c) => format!(
                "Add {}index on {} ({})",
                if c.index.unique { "unique " } else { "" },
                c.table_name,
                c.index.fields.join(", ")
            ),
        }
    }

    /// Get the table this operation acts on (the old name for renames)
    pub fn target_table(&self) -> &str {
        match self {
            MigrationOp::CreateTable(c) => &c.table_name,
            MigrationOp::DropTable(c) => &c.table_name,
            MigrationOp::RenameTable(c) => &c.old_name,
            MigrationOp::AddColumn(c) => &c.table_name,
            MigrationOp::RemoveColumn(c) => &c.table_name,
            MigrationOp::ChangeColumn(c) => &c.table_name,
            MigrationOp::AddIndex(c) => &c.table_name,
        }
    }

    /// Check if this operation can lose data
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            MigrationOp::DropTable(_) | MigrationOp::RemoveColumn(_) | MigrationOp::ChangeColumn(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        let def = ColumnDefinition::new("INTEGER");
        assert_eq!(
            MigrationOp::add_column("users", "age", &def).description(),
            "Add column age (INTEGER) to users"
        );
        assert_eq!(
            MigrationOp::rename_table("user", "users").description(),
            "Rename table user to users"
        );
    }

    #[test]
    fn test_rename_targets_old_table() {
        assert_eq!(MigrationOp::rename_table("user", "users").target_table(), "user");
        assert_eq!(MigrationOp::rename_table("user", "users").method(), "renameTable");
    }

    #[test]
    fn test_destructive_operations() {
        let def = ColumnDefinition::new("STRING");
        assert!(MigrationOp::remove_column("users", "email").is_destructive());
        assert!(MigrationOp::change_column("users", "email", &def).is_destructive());
        assert!(!MigrationOp::add_column("users", "email", &def).is_destructive());
        assert!(!MigrationOp::rename_table("a", "b").is_destructive());
    }

    #[test]
    fn test_serializes_with_op_tag() {
        let value = serde_json::to_value(MigrationOp::remove_column("users", "age")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "op": "remove_column", "tableName": "users", "columnName": "age" })
        );
    }
}
