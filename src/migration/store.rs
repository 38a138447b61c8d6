//! Migration Store
//!
//! Writes synthesized migrations into the migrations directory and lists
//! the ones already there.

use crate::error::{conflict_error, AppResult};
use crate::migration::naming::parse_file_name;
use crate::migration::synthesizer::{checksum, MigrationArtifact};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// A migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEntry {
    pub file_name: String,
    pub timestamp: String,
    pub description: String,
    pub checksum: String,
}

pub struct MigrationStore {
    dir: PathBuf,
}

impl MigrationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write an artifact to `<dir>/<file_name>`.
    ///
    /// Existing files are never overwritten: a name clash is a `Conflict`.
    pub fn persist(&self, artifact: &MigrationArtifact) -> AppResult<PathBuf> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            info!("Created migrations directory {}", self.dir.display());
        }

        let path = self.dir.join(artifact.file_name());
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    conflict_error(format!("Migration {} already exists", path.display()))
                }
                _ => e.into(),
            })?;
        file.write_all(artifact.code().as_bytes())?;

        info!(
            checksum = %artifact.checksum(),
            "Wrote migration {}",
            path.display()
        );
        Ok(path)
    }

    /// Migration files in the directory, oldest first.
    ///
    /// Files not named `<timestamp>-<description>.js` are ignored.
    pub fn list(&self) -> AppResult<Vec<MigrationEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((timestamp, description)) = parse_file_name(file_name) else {
                debug!("Skipping {}: not a migration file", path.display());
                continue;
            };

            let content = fs::read(&path)?;
            entries.push(MigrationEntry {
                file_name: file_name.to_string(),
                timestamp: timestamp.to_string(),
                description: description.to_string(),
                checksum: checksum(&content),
            });
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::migration::synthesizer::MigrationSynthesizer;
    use crate::models::{ColumnDefinition, TableSchema};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn artifact(second: u32) -> MigrationArtifact {
        let old = TableSchema::new("User");
        let new = TableSchema::new("User").column("email", ColumnDefinition::new("STRING"));
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, second).unwrap();
        MigrationSynthesizer::synthesize(&old, &new, at).unwrap().unwrap()
    }

    #[test]
    fn test_persist_writes_rendered_code() {
        let dir = tempfile::tempdir().unwrap();
        let store = MigrationStore::new(dir.path().join("migrations"));
        let artifact = artifact(0);

        let path = store.persist(&artifact).unwrap();

        assert_eq!(path, dir.path().join("migrations").join("20261019080000-alter-users.js"));
        assert_eq!(fs::read_to_string(&path).unwrap(), artifact.code());
    }

    #[test]
    fn test_persist_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = MigrationStore::new(dir.path());
        let artifact = artifact(0);

        store.persist(&artifact).unwrap();
        let err = store.persist(&artifact).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_list_sorts_and_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let store = MigrationStore::new(dir.path());
        let later = artifact(30);
        let earlier = artifact(5);
        store.persist(&later).unwrap();
        store.persist(&earlier).unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();

        let entries = store.list().unwrap();

        assert_eq!(
            entries.iter().map(|e| e.file_name.as_str()).collect::<Vec<_>>(),
            vec!["20261019080005-alter-users.js", "20261019080030-alter-users.js"]
        );
        assert_eq!(entries[0].timestamp, "20261019080005");
        assert_eq!(entries[0].description, "alter-users");
        assert_eq!(entries[0].checksum, earlier.checksum());
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MigrationStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
