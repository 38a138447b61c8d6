//! Migration Synthesizer
//!
//! Turns a schema diff into paired forward/reverse operation lists and
//! renders them as a migration artifact.

use crate::error::AppResult;
use crate::migration::naming::{alter_description, create_description, migration_file_name};
use crate::migration::operations::{AddIndexOp, CreateTableOp, DropTableOp, MigrationOp};
use crate::migration::render::MigrationRenderer;
use crate::models::{ModelConfig, TableSchema};
use crate::snapshot::{ColumnDelta, DiffEngine, SchemaDiff};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// A generated migration: file name, operations and rendered code.
///
/// Built once per synthesis and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationArtifact {
    file_name: String,
    generated_at: DateTime<Utc>,
    /// Table the forward list starts from
    source_table: String,
    /// Table the forward list ends on
    target_table: String,
    up: Vec<MigrationOp>,
    down: Vec<MigrationOp>,
    code: String,
}

impl MigrationArtifact {
    fn new(
        description: &str,
        generated_at: DateTime<Utc>,
        source_table: String,
        target_table: String,
        up: Vec<MigrationOp>,
        down: Vec<MigrationOp>,
    ) -> AppResult<Self> {
        let code = MigrationRenderer::render(&up, &down)?;
        Ok(Self {
            file_name: migration_file_name(generated_at, description),
            generated_at,
            source_table,
            target_table,
            up,
            down,
            code,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    /// Forward operations, in execution order
    pub fn up(&self) -> &[MigrationOp] {
        &self.up
    }

    /// Reverse operations, in execution order
    pub fn down(&self) -> &[MigrationOp] {
        &self.down
    }

    /// Rendered module source
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Hex SHA-256 of the rendered code
    pub fn checksum(&self) -> String {
        checksum(self.code.as_bytes())
    }
}

/// Hex SHA-256 of `content`
pub fn checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

pub struct MigrationSynthesizer;

impl MigrationSynthesizer {
    /// Build the alter migration that moves `old` to `new`.
    ///
    /// Returns `Ok(None)` when the snapshots have no column delta and no
    /// table rename; synthesizing a schema against itself is always `None`.
    pub fn synthesize(
        old: &TableSchema,
        new: &TableSchema,
        generated_at: DateTime<Utc>,
    ) -> AppResult<Option<MigrationArtifact>> {
        let diff = DiffEngine::diff(old, new);
        Self::from_diff(&diff, generated_at)
    }

    /// Build the alter migration for an already computed diff
    pub fn from_diff(diff: &SchemaDiff<'_>, generated_at: DateTime<Utc>) -> AppResult<Option<MigrationArtifact>> {
        if diff.is_empty() {
            debug!("No structural changes for {}; no migration needed", diff.new_schema().name);
            return Ok(None);
        }

        // Forward ops run against the new table name (after the rename);
        // reverse ops run against the old one (after the reverse rename).
        let target = diff.new_schema().resolved_table_name();
        let source = match diff.rename() {
            Some((old_name, _)) => old_name.to_string(),
            None => target.clone(),
        };

        let mut up = Vec::new();
        let mut down = Vec::new();

        if let Some((old_name, new_name)) = diff.rename() {
            up.push(MigrationOp::rename_table(old_name, new_name));
            down.push(MigrationOp::rename_table(new_name, old_name));
        }

        let deltas = diff.deltas();

        for delta in &deltas {
            if let ColumnDelta::Added { name, new } = delta {
                up.push(MigrationOp::add_column(&target, name, new));
                down.push(MigrationOp::remove_column(&source, name));
            }
        }

        for delta in &deltas {
            if let ColumnDelta::Removed { name, old } = delta {
                up.push(MigrationOp::remove_column(&target, name));
                down.push(MigrationOp::add_column(&source, name, old));
            }
        }

        for delta in &deltas {
            if let ColumnDelta::Changed { name, old, new } = delta {
                up.push(MigrationOp::change_column(&target, name, new));
                down.push(MigrationOp::change_column(&source, name, old));
            }
        }

        let artifact = MigrationArtifact::new(&alter_description(&target), generated_at, source, target, up, down)?;

        info!(
            "Synthesized {} ({} forward, {} reverse operations)",
            artifact.file_name(),
            artifact.up().len(),
            artifact.down().len()
        );
        Ok(Some(artifact))
    }

    /// Build the initial migration that creates a model's table
    pub fn create_table(model: &ModelConfig, generated_at: DateTime<Utc>) -> AppResult<MigrationArtifact> {
        let table = model.table_schema().resolved_table_name();

        let mut up = vec![MigrationOp::CreateTable(CreateTableOp {
            table_name: table.clone(),
            columns: model.schema.clone(),
            timestamps: model.timestamps_enabled(),
        })];
        up.extend(model.indexes.iter().map(|index| {
            MigrationOp::AddIndex(AddIndexOp {
                table_name: table.clone(),
                index: index.clone(),
            })
        }));

        let down = vec![MigrationOp::DropTable(DropTableOp {
            table_name: table.clone(),
        })];

        let artifact = MigrationArtifact::new(
            &create_description(&model.name),
            generated_at,
            table.clone(),
            table,
            up,
            down,
        )?;

        info!("Synthesized {} for model {}", artifact.file_name(), model.name);
        Ok(artifact)
    }
}
