//! Field definition rendering
//!
//! Column definitions are first compiled into a `FieldSpec`, an ordered list
//! of attributes, and only turned into JavaScript text when displayed.

use crate::error::{invalid_schema_error, AppResult};
use crate::models::column::ENUM_TYPE;
use crate::models::{ColumnDefinition, DefaultValue};
use std::fmt;

/// Namespace the generated migration receives as its second argument
pub const SEQUELIZE: &str = "Sequelize";

/// A column type as a Sequelize constructor expression
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Sequelize.STRING`; unknown tags pass through verbatim
    Named(String),
    /// `Sequelize.STRING(100)`, `Sequelize.DECIMAL(10, 2)`
    Sized(String),
    /// `Sequelize.ENUM('a', 'b')`
    Enum(Vec<String>),
    /// `Sequelize.ARRAY(Sequelize.INTEGER)`
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    /// Compile a type tag. ENUM (also as an array element) requires `values`.
    pub fn parse(data_type: &str, values: Option<&[String]>) -> AppResult<Self> {
        if data_type.contains("[]") {
            let base = data_type.replacen("[]", "", 1);
            return Ok(TypeExpr::Array(Box::new(Self::parse(&base, values)?)));
        }
        if data_type.contains('(') {
            return Ok(TypeExpr::Sized(data_type.to_string()));
        }
        if data_type == ENUM_TYPE {
            return match values {
                Some(values) if !values.is_empty() => Ok(TypeExpr::Enum(values.to_vec())),
                _ => Err(invalid_schema_error("ENUM type requires a non-empty `values` list")),
            };
        }
        Ok(TypeExpr::Named(data_type.to_string()))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) | TypeExpr::Sized(name) => write!(f, "{}.{}", SEQUELIZE, name),
            TypeExpr::Enum(values) => {
                let values: Vec<String> = values.iter().map(|v| js_string(v)).collect();
                write!(f, "{}.ENUM({})", SEQUELIZE, values.join(", "))
            }
            TypeExpr::Array(inner) => write!(f, "{}.ARRAY({})", SEQUELIZE, inner),
        }
    }
}

/// A default value as a JavaScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExpr {
    /// `null`
    Null,
    /// `Sequelize.fn('NOW')`
    Now,
    Bool(bool),
    /// Unquoted numeric literal
    Number(String),
    /// Quoted string literal
    Text(String),
    /// JSON array/object literal
    Json(String),
}

impl From<&DefaultValue> for DefaultExpr {
    fn from(value: &DefaultValue) -> Self {
        match value {
            v if v.is_now() => DefaultExpr::Now,
            DefaultValue::Null => DefaultExpr::Null,
            DefaultValue::Bool(b) => DefaultExpr::Bool(*b),
            DefaultValue::Number(n) => DefaultExpr::Number(n.to_string()),
            DefaultValue::Text(s) => match numeric_literal(s) {
                Some(number) => DefaultExpr::Number(number),
                None => DefaultExpr::Text(s.clone()),
            },
            DefaultValue::Json(v) => DefaultExpr::Json(v.to_string()),
        }
    }
}

impl fmt::Display for DefaultExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultExpr::Null => f.write_str("null"),
            DefaultExpr::Now => write!(f, "{}.fn('NOW')", SEQUELIZE),
            DefaultExpr::Bool(b) => write!(f, "{}", b),
            DefaultExpr::Number(n) | DefaultExpr::Json(n) => f.write_str(n),
            DefaultExpr::Text(s) => f.write_str(&js_string(s)),
        }
    }
}

/// Strings that parse fully as a finite number are rendered unquoted.
///
/// Leading zeros (`007`) would be a legacy octal literal in strict mode, so
/// those are written in canonical form instead.
fn numeric_literal(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unsigned = trimmed.trim_start_matches(|c: char| c == '-' || c == '+');
    let starts_like_number = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    let leading_zero = unsigned.starts_with('0') && unsigned[1..].starts_with(|c: char| c.is_ascii_digit());
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && starts_like_number && leading_zero => Some(n.to_string()),
        Ok(n) if n.is_finite() && starts_like_number => Some(trimmed.to_string()),
        _ => None,
    }
}

/// Compiled attributes of one column.
///
/// Attributes render in a fixed order: `type`, `allowNull` (only when
/// false), `unique` (only when true), `defaultValue` (only when set).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub ty: TypeExpr,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<DefaultExpr>,
}

impl FieldSpec {
    pub fn from_definition(definition: &ColumnDefinition) -> AppResult<Self> {
        Ok(Self {
            ty: TypeExpr::parse(&definition.data_type, definition.values.as_deref())?,
            nullable: definition.is_nullable(),
            unique: definition.is_unique(),
            default: definition.default_value.as_ref().map(DefaultExpr::from),
        })
    }

    /// `(key, expression)` pairs in render order
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes = vec![("type", self.ty.to_string())];
        if !self.nullable {
            attributes.push(("allowNull", "false".to_string()));
        }
        if self.unique {
            attributes.push(("unique", "true".to_string()));
        }
        if let Some(default) = &self.default {
            attributes.push(("defaultValue", default.to_string()));
        }
        attributes
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attributes()
            .into_iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        write!(f, "{{ {} }}", parts.join(", "))
    }
}

/// Single-quoted JavaScript string literal
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Object key: bare when it is a plain identifier, quoted otherwise
pub fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        name.to_string()
    } else {
        js_string(name)
    }
}
