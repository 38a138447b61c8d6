//! Dry run executor
//!
//! Replays a migration's operations against an in-memory table and checks
//! that `up` reaches the new snapshot and `down` returns to the old one.
//! Nothing touches a database.

use crate::error::AppResult;
use crate::migration::{MigrationArtifact, MigrationOp};
use crate::models::{Columns, ModelConfig, TableSchema};
use serde::Serialize;
use tracing::{debug, warn};

/// In-memory state of one table while operations are replayed
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaState {
    pub table_name: String,
    pub columns: Columns,
    pub exists: bool,
}

impl SchemaState {
    /// An existing table with the given columns
    pub fn existing(table_name: impl Into<String>, columns: Columns) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            exists: true,
        }
    }

    /// No table yet
    pub fn absent(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Columns::new(),
            exists: false,
        }
    }

    /// Apply one operation, enforcing its precondition
    pub fn apply(&mut self, op: &MigrationOp) -> Result<(), String> {
        match op {
            MigrationOp::CreateTable(c) => {
                if self.exists {
                    return Err(format!("table {} already exists", self.table_name));
                }
                self.table_name = c.table_name.clone();
                self.columns = c.columns.clone();
                self.exists = true;
            }
            MigrationOp::DropTable(c) => {
                self.require_table(&c.table_name)?;
                self.columns = Columns::new();
                self.exists = false;
            }
            MigrationOp::RenameTable(c) => {
                self.require_table(&c.old_name)?;
                self.table_name = c.new_name.clone();
            }
            MigrationOp::AddColumn(c) => {
                self.require_table(&c.table_name)?;
                if self.columns.contains(&c.column_name) {
                    return Err(format!("column {}.{} already exists", c.table_name, c.column_name));
                }
                self.columns.insert(c.column_name.clone(), c.definition.clone());
            }
            MigrationOp::RemoveColumn(c) => {
                self.require_table(&c.table_name)?;
                if self.columns.remove(&c.column_name).is_none() {
                    return Err(format!("column {}.{} does not exist", c.table_name, c.column_name));
                }
            }
            MigrationOp::ChangeColumn(c) => {
                self.require_table(&c.table_name)?;
                if !self.columns.contains(&c.column_name) {
                    return Err(format!("column {}.{} does not exist", c.table_name, c.column_name));
                }
                self.columns.insert(c.column_name.clone(), c.definition.clone());
            }
            MigrationOp::AddIndex(c) => {
                self.require_table(&c.table_name)?;
                if let Some(missing) = c.index.fields.iter().find(|f| !self.columns.contains(f)) {
                    return Err(format!("index field {}.{} does not exist", c.table_name, missing));
                }
            }
        }
        Ok(())
    }

    fn require_table(&self, table_name: &str) -> Result<(), String> {
        if !self.exists || self.table_name != table_name {
            return Err(format!("table {} does not exist", table_name));
        }
        Ok(())
    }

    /// Same table and same columns; column order is not compared
    fn matches(&self, other: &SchemaState) -> bool {
        self.exists == other.exists
            && (!self.exists || (self.table_name == other.table_name && self.columns.same_set(&other.columns)))
    }
}

pub struct DryRunner;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    pub success: bool,
    pub error: Option<String>,
    pub execution_plan: Vec<String>,
    pub warnings: Vec<String>,
}

impl DryRunner {
    /// Verify an alter migration between two snapshots.
    ///
    /// `up` replayed on the old snapshot must give the new one, and `down`
    /// replayed on that result must give the old one back. A failed check
    /// is reported in the result, not as an error.
    pub fn verify(old: &TableSchema, new: &TableSchema, artifact: &MigrationArtifact) -> AppResult<DryRunResult> {
        let before = SchemaState::existing(artifact.source_table(), old.columns.clone());
        let after = SchemaState::existing(artifact.target_table(), new.columns.clone());
        Ok(Self::round_trip(before, after, artifact))
    }

    /// Verify a create-table migration for a model
    pub fn verify_create(model: &ModelConfig, artifact: &MigrationArtifact) -> AppResult<DryRunResult> {
        let table = artifact.target_table();
        let before = SchemaState::absent(table);
        let after = SchemaState::existing(table, model.schema.clone());
        Ok(Self::round_trip(before, after, artifact))
    }

    fn round_trip(before: SchemaState, after: SchemaState, artifact: &MigrationArtifact) -> DryRunResult {
        let mut execution_plan = Vec::new();
        let warnings: Vec<String> = artifact
            .up()
            .iter()
            .filter(|op| op.is_destructive())
            .map(|op| format!("Destructive operation: {}", op.description()))
            .collect();

        let mut state = before.clone();
        for (direction, ops, expected) in [("up", artifact.up(), &after), ("down", artifact.down(), &before)] {
            for (i, op) in ops.iter().enumerate() {
                execution_plan.push(format!("{} step {}: {}", direction, i + 1, op.description()));
                if let Err(reason) = state.apply(op) {
                    warn!("Dry run of {} failed at {} step {}: {}", artifact.file_name(), direction, i + 1, reason);
                    return DryRunResult {
                        success: false,
                        error: Some(format!("{} step {} failed: {}", direction, i + 1, reason)),
                        execution_plan,
                        warnings,
                    };
                }
            }

            if !state.matches(expected) {
                warn!("Dry run of {}: {} did not reach the expected schema", artifact.file_name(), direction);
                return DryRunResult {
                    success: false,
                    error: Some(format!(
                        "after {} the table is {} ({} columns), expected {} ({} columns)",
                        direction,
                        state.table_name,
                        state.columns.len(),
                        expected.table_name,
                        expected.columns.len()
                    )),
                    execution_plan,
                    warnings,
                };
            }
        }

        debug!("Dry run of {} passed ({} steps)", artifact.file_name(), execution_plan.len());
        DryRunResult {
            success: true,
            error: None,
            execution_plan,
            warnings,
        }
    }
}
