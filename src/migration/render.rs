//! Migration code renderer
//!
//! Turns forward/reverse operation lists into a CommonJS module with
//! `up` and `down` procedures over Sequelize's query interface.

use crate::error::AppResult;
use crate::migration::field::{js_key, js_string, FieldSpec};
use crate::migration::operations::*;

const STATEMENT_INDENT: &str = "    ";

pub struct MigrationRenderer;

impl MigrationRenderer {
    /// Render the complete migration module
    pub fn render(up: &[MigrationOp], down: &[MigrationOp]) -> AppResult<String> {
        let up_body = Self::procedure_body(up, "No schema changes detected")?;
        let down_body = Self::procedure_body(down, "No rollback needed")?;

        Ok(format!(
            "'use strict';\n\nmodule.exports = {{\n  up: async (queryInterface, Sequelize) => {{\n{}\n  }},\n\n  down: async (queryInterface, Sequelize) => {{\n{}\n  }}\n}};\n",
            up_body, down_body
        ))
    }

    /// Render one procedure's statements, one per line
    pub fn procedure_body(ops: &[MigrationOp], empty_note: &str) -> AppResult<String> {
        if ops.is_empty() {
            return Ok(format!("{}// {}", STATEMENT_INDENT, empty_note));
        }
        let statements = ops
            .iter()
            .map(|op| Self::op_to_js(op).map(|call| format!("{}await queryInterface.{};", STATEMENT_INDENT, call)))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(statements.join("\n"))
    }

    /// Convert a single operation to its query-interface call (without `await`)
    pub fn op_to_js(op: &MigrationOp) -> AppResult<String> {
        let call = match op {
            MigrationOp::CreateTable(c) => Self::create_table_js(c)?,
            MigrationOp::DropTable(c) => format!("dropTable({})", js_string(&c.table_name)),
            MigrationOp::RenameTable(c) => format!(
                "renameTable({}, {})",
                js_string(&c.old_name),
                js_string(&c.new_name)
            ),
            MigrationOp::AddColumn(c) => format!(
                "addColumn({}, {}, {})",
                js_string(&c.table_name),
                js_string(&c.column_name),
                FieldSpec::from_definition(&c.definition)?
            ),
            MigrationOp::RemoveColumn(c) => format!(
                "removeColumn({}, {})",
                js_string(&c.table_name),
                js_string(&c.column_name)
            ),
            MigrationOp::ChangeColumn(c) => format!(
                "changeColumn({}, {}, {})",
                js_string(&c.table_name),
                js_string(&c.column_name),
                FieldSpec::from_definition(&c.definition)?
            ),
            MigrationOp::AddIndex(c) => Self::add_index_js(c),
        };
        Ok(call)
    }

    fn create_table_js(c: &CreateTableOp) -> AppResult<String> {
        let mut columns = vec![
            "      id: {\n        allowNull: false,\n        autoIncrement: true,\n        primaryKey: true,\n        type: Sequelize.INTEGER\n      }".to_string(),
        ];

        for (name, definition) in c.columns.iter() {
            columns.push(format!("      {}: {}", js_key(name), FieldSpec::from_definition(definition)?));
        }

        if c.timestamps {
            columns.push("      createdAt: { allowNull: false, type: Sequelize.DATE }".to_string());
            columns.push("      updatedAt: { allowNull: false, type: Sequelize.DATE }".to_string());
        }

        Ok(format!(
            "createTable({}, {{\n{}\n    }})",
            js_string(&c.table_name),
            columns.join(",\n")
        ))
    }

    fn add_index_js(c: &AddIndexOp) -> String {
        let fields: Vec<String> = c.index.fields.iter().map(|f| js_string(f)).collect();

        let mut options = Vec::new();
        if c.index.unique {
            options.push("unique: true".to_string());
        }
        if let Some(ref index_type) = c.index.index_type {
            options.push(format!("type: {}", js_string(index_type)));
        }

        if options.is_empty() {
            format!("addIndex({}, [{}])", js_string(&c.table_name), fields.join(", "))
        } else {
            format!(
                "addIndex({}, [{}], {{ {} }})",
                js_string(&c.table_name),
                fields.join(", "),
                options.join(", ")
            )
        }
    }
}
