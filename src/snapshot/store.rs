//! Model Store
//!
//! Loads and saves model JSON files: the schema snapshots that migrations
//! are derived from.

use crate::error::{invalid_schema_error, not_found_error, AppResult};
use crate::models::ModelConfig;
use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

/// File-backed store of `<Name>.json` model definitions
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of a model's file inside the store
    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.root.join(format!("{}.json", model_name))
    }

    /// Load a model by name
    pub fn load(&self, model_name: &str) -> AppResult<ModelConfig> {
        let path = self.path_for(model_name);
        if !path.exists() {
            return Err(not_found_error(format!(
                "Model \"{}\" not found in {}",
                model_name,
                self.root.display()
            )));
        }
        Self::load_file(&path)
    }

    /// Parse and validate a model file anywhere on disk
    pub fn load_file(path: &Path) -> AppResult<ModelConfig> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => not_found_error(format!("Model file {}", path.display())),
            _ => e.into(),
        })?;

        let model: ModelConfig = serde_json::from_str(&content)
            .map_err(|e| invalid_schema_error(format!("{}: {}", path.display(), e)))?;
        model
            .validate()
            .map_err(|e| invalid_schema_error(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            "Loaded model {} from {} ({} columns)",
            model.name,
            path.display(),
            model.schema.len()
        );
        Ok(model)
    }

    /// Write a model as pretty-printed JSON, creating the directory if needed
    pub fn save(&self, model: &ModelConfig) -> AppResult<PathBuf> {
        model.validate()?;

        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
            tracing::info!("Created models directory {}", self.root.display());
        }

        let path = self.path_for(&model.name);
        let content = serde_json::to_string_pretty(model)?;
        fs::write(&path, content)?;

        tracing::info!("Saved model {} to {}", model.name, path.display());
        Ok(path)
    }

    /// Names of all stored models, sorted
    pub fn list(&self) -> AppResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}
