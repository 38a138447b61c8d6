//! Schema Diff Engine
//!
//! Classifies every column of two table snapshots as added, removed,
//! changed or unchanged, and detects a table rename.

use crate::models::{ColumnDefinition, TableSchema};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Type of column change detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// Classification of a single column name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDelta<'a> {
    Added {
        name: &'a str,
        new: &'a ColumnDefinition,
    },
    Removed {
        name: &'a str,
        old: &'a ColumnDefinition,
    },
    Changed {
        name: &'a str,
        old: &'a ColumnDefinition,
        new: &'a ColumnDefinition,
    },
    Unchanged {
        name: &'a str,
    },
}

impl<'a> ColumnDelta<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            ColumnDelta::Added { name, .. }
            | ColumnDelta::Removed { name, .. }
            | ColumnDelta::Changed { name, .. }
            | ColumnDelta::Unchanged { name } => name,
        }
    }

    pub fn change_type(&self) -> ChangeType {
        match self {
            ColumnDelta::Added { .. } => ChangeType::Added,
            ColumnDelta::Removed { .. } => ChangeType::Removed,
            ColumnDelta::Changed { .. } => ChangeType::Changed,
            ColumnDelta::Unchanged { .. } => ChangeType::Unchanged,
        }
    }
}

/// Complete diff between an old and a new snapshot of one table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff<'a> {
    #[serde(skip)]
    old: &'a TableSchema,
    #[serde(skip)]
    new: &'a TableSchema,
    /// In the new snapshot only, in its declaration order
    pub added: Vec<&'a str>,
    /// In the old snapshot only, in its declaration order
    pub removed: Vec<&'a str>,
    /// In both with different definitions, in the new snapshot's order
    pub changed: Vec<&'a str>,
    /// In both with equal definitions, in the new snapshot's order
    pub unchanged: Vec<&'a str>,
    /// Both snapshots declare a table name and the names differ
    pub table_renamed: bool,
}

/// Summary statistics for the diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub columns_added: usize,
    pub columns_removed: usize,
    pub columns_changed: usize,
    pub columns_unchanged: usize,
    pub table_renamed: bool,
    pub total_changes: usize,
}

impl<'a> SchemaDiff<'a> {
    /// No column delta and no table rename
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty() && !self.table_renamed
    }

    /// `(old, new)` physical table names when a rename was detected
    pub fn rename(&self) -> Option<(&'a str, &'a str)> {
        if !self.table_renamed {
            return None;
        }
        Some((self.old.declared_table_name()?, self.new.declared_table_name()?))
    }

    pub fn old_schema(&self) -> &'a TableSchema {
        self.old
    }

    pub fn new_schema(&self) -> &'a TableSchema {
        self.new
    }

    /// Every column name of both snapshots with its classification.
    ///
    /// Names of the new snapshot come first in its order, followed by the
    /// removed names in the old snapshot's order.
    pub fn deltas(&self) -> Vec<ColumnDelta<'a>> {
        let old: &'a TableSchema = self.old;
        let new: &'a TableSchema = self.new;
        let (old, new) = (&old.columns, &new.columns);

        let mut deltas: Vec<ColumnDelta<'a>> = new
            .iter()
            .map(|(name, new_def)| match old.get(name) {
                None => ColumnDelta::Added { name, new: new_def },
                Some(old_def) if old_def == new_def => ColumnDelta::Unchanged { name },
                Some(old_def) => ColumnDelta::Changed {
                    name,
                    old: old_def,
                    new: new_def,
                },
            })
            .collect();

        deltas.extend(
            old.iter()
                .filter(|(name, _)| !new.contains(name))
                .map(|(name, old_def)| ColumnDelta::Removed { name, old: old_def }),
        );

        deltas
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            columns_added: self.added.len(),
            columns_removed: self.removed.len(),
            columns_changed: self.changed.len(),
            columns_unchanged: self.unchanged.len(),
            table_renamed: self.table_renamed,
            total_changes: self.added.len()
                + self.removed.len()
                + self.changed.len()
                + usize::from(self.table_renamed),
        }
    }
}

/// The diff engine that compares table snapshots
pub struct DiffEngine;

impl DiffEngine {
    /// Compare two snapshots. Pure and infallible; neither input is modified.
    pub fn diff<'a>(old: &'a TableSchema, new: &'a TableSchema) -> SchemaDiff<'a> {
        let old_names: HashSet<&str> = old.columns.names().collect();
        let new_names: HashSet<&str> = new.columns.names().collect();

        // Detect added columns
        let added: Vec<&str> = new
            .columns
            .names()
            .filter(|name| !old_names.contains(name))
            .collect();

        // Detect removed columns
        let removed: Vec<&str> = old
            .columns
            .names()
            .filter(|name| !new_names.contains(name))
            .collect();

        // Split shared columns by deep equality
        let (changed, unchanged): (Vec<&str>, Vec<&str>) = new
            .columns
            .iter()
            .filter_map(|(name, new_def)| old.columns.get(name).map(|old_def| (name, old_def, new_def)))
            .fold((Vec::new(), Vec::new()), |(mut changed, mut unchanged), (name, old_def, new_def)| {
                if old_def == new_def {
                    unchanged.push(name);
                } else {
                    changed.push(name);
                }
                (changed, unchanged)
            });

        let table_renamed = Self::is_table_renamed(old, new);

        debug!(
            "Diffed {} → {}: {} added, {} removed, {} changed, renamed: {}",
            old.resolved_table_name(),
            new.resolved_table_name(),
            added.len(),
            removed.len(),
            changed.len(),
            table_renamed
        );

        SchemaDiff {
            old,
            new,
            added,
            removed,
            changed,
            unchanged,
            table_renamed,
        }
    }

    fn is_table_renamed(old: &TableSchema, new: &TableSchema) -> bool {
        match (old.declared_table_name(), new.declared_table_name()) {
            (Some(from), Some(to)) => from != to,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DefaultValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> TableSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_added_column_example() {
        let old = TableSchema::new("User").column("email", ColumnDefinition::new("STRING").not_null());
        let new = old
            .clone()
            .column("age", ColumnDefinition::new("INTEGER").default(DefaultValue::Number(18.into())));

        let diff = DiffEngine::diff(&old, &new);

        assert_eq!(diff.added, vec!["age"]);
        assert!(diff.removed.is_empty());
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged, vec!["email"]);
        assert!(!diff.table_renamed);
    }

    #[test]
    fn test_orders_follow_declaration_not_alphabet() {
        let old = schema(json!({
            "name": "Post",
            "columns": {
                "zeta": { "type": "STRING" },
                "beta": { "type": "STRING" },
                "kept": { "type": "STRING" },
                "alpha": { "type": "STRING" }
            }
        }));
        let new = schema(json!({
            "name": "Post",
            "columns": {
                "kept": { "type": "TEXT" },
                "yankee": { "type": "STRING" },
                "bravo": { "type": "STRING" }
            }
        }));

        let diff = DiffEngine::diff(&old, &new);

        assert_eq!(diff.added, vec!["yankee", "bravo"]);
        assert_eq!(diff.removed, vec!["zeta", "beta", "alpha"]);
        assert_eq!(diff.changed, vec!["kept"]);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let old = schema(json!({
            "name": "User",
            "columns": { "email": { "type": "STRING", "allowNull": false, "unique": true, "comment": { "a": 1, "b": 2 } } }
        }));
        let new = schema(json!({
            "name": "User",
            "columns": { "email": { "comment": { "b": 2, "a": 1 }, "unique": true, "allowNull": false, "type": "STRING" } }
        }));

        let diff = DiffEngine::diff(&old, &new);
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged, vec!["email"]);
    }

    #[test]
    fn test_single_nested_value_marks_changed() {
        let old = TableSchema::new("Post").column("status", ColumnDefinition::new("ENUM").values(["draft", "live"]));
        let new = TableSchema::new("Post").column("status", ColumnDefinition::new("ENUM").values(["draft", "archived"]));

        assert_eq!(DiffEngine::diff(&old, &new).changed, vec!["status"]);
    }

    #[test]
    fn test_explicit_default_key_is_a_change() {
        // allowNull: true is the implied default, but the key itself differs
        let old = schema(json!({ "name": "User", "columns": { "bio": { "type": "TEXT" } } }));
        let new = schema(json!({ "name": "User", "columns": { "bio": { "type": "TEXT", "allowNull": true } } }));

        assert_eq!(DiffEngine::diff(&old, &new).changed, vec!["bio"]);
    }

    #[test]
    fn test_explicit_null_default_is_a_change() {
        let old = schema(json!({ "name": "User", "columns": { "bio": { "type": "TEXT", "default": null } } }));
        let new = schema(json!({ "name": "User", "columns": { "bio": { "type": "TEXT" } } }));

        assert_eq!(DiffEngine::diff(&old, &new).changed, vec!["bio"]);
        assert_eq!(DiffEngine::diff(&old, &old).unchanged, vec!["bio"]);
    }

    #[test]
    fn test_integral_float_default_is_unchanged() {
        let old = schema(json!({ "name": "User", "columns": { "age": { "type": "INTEGER", "default": 18 } } }));
        let new = schema(json!({ "name": "User", "columns": { "age": { "type": "INTEGER", "default": 18.0 } } }));

        let diff = DiffEngine::diff(&old, &new);
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged, vec!["age"]);
    }

    #[test]
    fn test_unknown_extra_key_marks_changed() {
        let old = TableSchema::new("User").column("id", ColumnDefinition::new("INTEGER"));
        let new = TableSchema::new("User").column("id", ColumnDefinition::new("INTEGER").with_extra("primaryKey", json!(true)));

        assert_eq!(DiffEngine::diff(&old, &new).changed, vec!["id"]);
    }

    #[test]
    fn test_table_rename_requires_both_names() {
        let cols = |s: TableSchema| s.column("email", ColumnDefinition::new("STRING"));

        let renamed = DiffEngine::diff(
            &cols(TableSchema::new("User").table_name("user")),
            &cols(TableSchema::new("User").table_name("users")),
        )
        .table_renamed;
        assert!(renamed);

        let old = cols(TableSchema::new("User"));
        let new = cols(TableSchema::new("User").table_name("people"));
        let diff = DiffEngine::diff(&old, &new);
        assert!(!diff.table_renamed);
        assert!(diff.is_empty());

        let old = cols(TableSchema::new("User").table_name("users"));
        let new = cols(TableSchema::new("User").table_name(""));
        assert!(!DiffEngine::diff(&old, &new).table_renamed);
    }

    #[test]
    fn test_rename_reports_both_names() {
        let old = TableSchema::new("User").table_name("user");
        let new = TableSchema::new("User").table_name("users");
        assert_eq!(DiffEngine::diff(&old, &new).rename(), Some(("user", "users")));
    }

    #[test]
    fn test_empty_schemas_diff_cleanly() {
        let empty = TableSchema::default();
        let diff = DiffEngine::diff(&empty, &empty);
        assert!(diff.is_empty());
        assert!(diff.deltas().is_empty());

        let new = TableSchema::new("User").column("email", ColumnDefinition::new("STRING"));
        assert_eq!(DiffEngine::diff(&empty, &new).added, vec!["email"]);
        assert_eq!(DiffEngine::diff(&new, &empty).removed, vec!["email"]);
    }

    #[test]
    fn test_classification_partitions_union() {
        let old = TableSchema::new("Order")
            .column("a", ColumnDefinition::new("STRING"))
            .column("b", ColumnDefinition::new("STRING"))
            .column("c", ColumnDefinition::new("STRING"));
        let new = TableSchema::new("Order")
            .column("b", ColumnDefinition::new("STRING").not_null())
            .column("c", ColumnDefinition::new("STRING"))
            .column("d", ColumnDefinition::new("DATE"));

        let diff = DiffEngine::diff(&old, &new);
        let mut seen: Vec<&str> = diff
            .added
            .iter()
            .chain(&diff.removed)
            .chain(&diff.changed)
            .chain(&diff.unchanged)
            .copied()
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);

        let deltas = diff.deltas();
        let kinds: Vec<(&str, ChangeType)> = deltas.iter().map(|d| (d.name(), d.change_type())).collect();
        assert_eq!(
            kinds,
            vec![
                ("b", ChangeType::Changed),
                ("c", ChangeType::Unchanged),
                ("d", ChangeType::Added),
                ("a", ChangeType::Removed),
            ]
        );
    }

    #[test]
    fn test_summary_counts_rename() {
        let old = TableSchema::new("User").table_name("user").column("a", ColumnDefinition::new("STRING"));
        let new = TableSchema::new("User").table_name("users").column("b", ColumnDefinition::new("STRING"));

        let summary = DiffEngine::diff(&old, &new).summary();
        assert_eq!(
            summary,
            DiffSummary {
                columns_added: 1,
                columns_removed: 1,
                columns_changed: 0,
                columns_unchanged: 0,
                table_renamed: true,
                total_changes: 3,
            }
        );
    }
}
