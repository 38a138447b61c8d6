//! Model file (`models/sequelize/<Name>.json`) structures

use crate::error::{validation_error, AppResult};
use crate::models::column::Columns;
use crate::models::schema::TableSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

static MODEL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid model name pattern"));

static TABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("valid table name pattern"));

/// Which ORM a model file targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Sequelize,
    Mongodb,
}

/// Association declared on a model (kept for code generation, not diffed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    #[serde(rename = "type")]
    pub kind: String,
    pub target: String,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Secondary index declared on a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct IndexDefinition {
    #[validate(length(min = 1, message = "An index needs at least one field"))]
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    /// `FULLTEXT` or `SPATIAL`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
}

/// A persisted model definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_model"))]
pub struct ModelConfig {
    #[validate(length(min = 1, max = 63, message = "Model name must be between 1 and 63 characters"))]
    #[validate(custom(function = "validate_model_name"))]
    pub name: String,

    #[serde(rename = "type", default)]
    pub db_type: DatabaseKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    #[serde(default)]
    pub schema: Columns,

    #[serde(default)]
    pub associations: Vec<Association>,

    #[serde(default)]
    pub options: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[validate(nested)]
    pub indexes: Vec<IndexDefinition>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_type: DatabaseKind::Sequelize,
            table_name: None,
            schema: Columns::new(),
            associations: Vec::new(),
            options: Map::new(),
            indexes: Vec::new(),
        }
    }

    /// Snapshot of the relational part of this model
    pub fn table_schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            table_name: self.table_name.clone(),
            columns: self.schema.clone(),
        }
    }

    /// `createdAt`/`updatedAt` are generated unless `options.timestamps` is false
    pub fn timestamps_enabled(&self) -> bool {
        self.options.get("timestamps") != Some(&Value::Bool(false))
    }

    /// Alter migrations only exist for relational models
    pub fn ensure_relational(&self) -> AppResult<()> {
        match self.db_type {
            DatabaseKind::Sequelize => Ok(()),
            DatabaseKind::Mongodb => Err(validation_error(format!(
                "Model \"{}\" is a MongoDB model; alter migrations are only supported for Sequelize",
                self.name
            ))),
        }
    }

    /// Combine this (existing) model with an edited version of it.
    ///
    /// The model keeps its name and kind; the schema comes from `incoming`;
    /// table name and associations fall back to the existing ones when the
    /// edit leaves them empty; options are merged key by key.
    pub fn merge_update(&self, incoming: ModelConfig) -> ModelConfig {
        let table_name = incoming
            .table_name
            .filter(|n| !n.is_empty())
            .or_else(|| self.table_name.clone());

        let associations = if incoming.associations.is_empty() {
            self.associations.clone()
        } else {
            incoming.associations
        };

        let mut options = self.options.clone();
        options.extend(incoming.options);

        let indexes = if incoming.indexes.is_empty() {
            self.indexes.clone()
        } else {
            incoming.indexes
        };

        ModelConfig {
            name: self.name.clone(),
            db_type: DatabaseKind::Sequelize,
            table_name,
            schema: incoming.schema,
            associations,
            options,
            indexes,
        }
    }
}

fn validate_model_name(name: &str) -> Result<(), ValidationError> {
    if !MODEL_NAME.is_match(name) {
        let mut err = ValidationError::new("invalid_model_name");
        err.message = Some("Model name must start with a letter or underscore and contain only letters, digits, underscores".into());
        return Err(err);
    }
    Ok(())
}

fn validate_model(model: &ModelConfig) -> Result<(), ValidationError> {
    if let Some(table) = model.table_name.as_deref().filter(|n| !n.is_empty()) {
        if !TABLE_NAME.is_match(table) {
            let mut err = ValidationError::new("invalid_table_name");
            err.message = Some(format!("Invalid table name \"{}\"", table).into());
            return Err(err);
        }
    }

    for (name, definition) in model.schema.iter() {
        if let Err(reason) = definition.validate_enum_values() {
            let mut err = ValidationError::new("invalid_column");
            err.message = Some(format!("Column \"{}\": {}", name, reason).into());
            return Err(err);
        }
    }

    for index in &model.indexes {
        if let Some(missing) = index.fields.iter().find(|f| !model.schema.contains(f)) {
            let mut err = ValidationError::new("unknown_index_field");
            err.message = Some(format!("Index references unknown field \"{}\"", missing).into());
            return Err(err);
        }
    }

    Ok(())
}
