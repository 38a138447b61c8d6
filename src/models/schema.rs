//! Table schema snapshots

use crate::models::column::{ColumnDefinition, Columns};
use serde::{Deserialize, Serialize};

/// Point-in-time description of one table's columns.
///
/// `name` is the logical model name; `table_name` the optional physical one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub columns: Columns,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            columns: Columns::new(),
        }
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn column(mut self, name: impl Into<String>, definition: ColumnDefinition) -> Self {
        self.columns.insert(name, definition);
        self
    }

    /// The explicitly declared table name; empty strings count as undeclared
    pub fn declared_table_name(&self) -> Option<&str> {
        self.table_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Physical table name: the declared one, or the model name pluralized
    pub fn resolved_table_name(&self) -> String {
        match self.declared_table_name() {
            Some(name) => name.to_string(),
            None => default_table_name(&self.name),
        }
    }
}

/// Naive pluralization: lowercase plus a trailing "s".
///
/// Irregular plurals are not handled (`Person` becomes `persons`).
pub fn default_table_name(model_name: &str) -> String {
    format!("{}s", model_name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_table_name_prefers_declared() {
        let schema = TableSchema::new("User").table_name("accounts");
        assert_eq!(schema.resolved_table_name(), "accounts");
    }

    #[test]
    fn test_empty_table_name_falls_back_to_plural() {
        let schema = TableSchema::new("User").table_name("");
        assert_eq!(schema.declared_table_name(), None);
        assert_eq!(schema.resolved_table_name(), "users");
    }

    #[test]
    fn test_naive_pluralization() {
        assert_eq!(default_table_name("Person"), "persons");
        assert_eq!(default_table_name("BlogPost"), "blogposts");
    }
}
