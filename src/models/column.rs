//! Column-level schema models

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Type tag that requires a `values` list
pub const ENUM_TYPE: &str = "ENUM";

/// Sentinel default meaning "current timestamp at write time"
pub const NOW_SENTINEL: &str = "now";

/// Declared default value of a column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// An explicit `"default": null`
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    /// Arrays and objects, kept as plain JSON
    Json(Value),
}

impl DefaultValue {
    /// True for the `"now"` sentinel
    pub fn is_now(&self) -> bool {
        matches!(self, DefaultValue::Text(s) if s == NOW_SENTINEL)
    }
}

/// Numbers compare by value, so `18` equals `18.0`
impl PartialEq for DefaultValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DefaultValue::Null, DefaultValue::Null) => true,
            (DefaultValue::Bool(a), DefaultValue::Bool(b)) => a == b,
            (DefaultValue::Number(a), DefaultValue::Number(b)) => numbers_equal(a, b),
            (DefaultValue::Text(a), DefaultValue::Text(b)) => a == b,
            (DefaultValue::Json(a), DefaultValue::Json(b)) => json_equal(a, b),
            _ => false,
        }
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => match (a.as_u64(), b.as_u64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
    }
}

/// Structural JSON equality with numbers compared by value
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_equal(a, b)),
        (Value::Object(a), Value::Object(b)) => maps_equal(a, b),
        _ => a == b,
    }
}

fn maps_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len() && a.iter().all(|(key, value)| b.get(key).is_some_and(|other| json_equal(value, other)))
}

/// Present keys always yield `Some`, so an explicit null is kept
fn explicit_default<'de, D>(deserializer: D) -> Result<Option<DefaultValue>, D::Error>
where
    D: Deserializer<'de>,
{
    DefaultValue::deserialize(deserializer).map(Some)
}

/// One column of a relational schema snapshot.
///
/// Keys the tool does not interpret (`primaryKey`, `comment`, ...) are kept
/// in `extra` so that equality covers every key of the original definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_null: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,

    #[serde(
        rename = "default",
        default,
        deserialize_with = "explicit_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<DefaultValue>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PartialEq for ColumnDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.data_type == other.data_type
            && self.values == other.values
            && self.allow_null == other.allow_null
            && self.unique == other.unique
            && self.default_value == other.default_value
            && maps_equal(&self.extra, &other.extra)
    }
}

impl ColumnDefinition {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            values: None,
            allow_null: None,
            unique: None,
            default_value: None,
            extra: Map::new(),
        }
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = Some(false);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Columns are nullable unless `allowNull` is explicitly false
    pub fn is_nullable(&self) -> bool {
        self.allow_null != Some(false)
    }

    pub fn is_unique(&self) -> bool {
        self.unique == Some(true)
    }

    pub fn is_enum(&self) -> bool {
        self.data_type == ENUM_TYPE
    }

    /// ENUM columns must carry a non-empty ordered list of values
    pub fn validate_enum_values(&self) -> Result<(), String> {
        if !self.is_enum() {
            return Ok(());
        }
        match &self.values {
            Some(values) if !values.is_empty() => Ok(()),
            _ => Err("ENUM type requires a non-empty `values` list".to_string()),
        }
    }
}

/// Insertion-ordered mapping of column name to definition.
///
/// Backed by a vector so that iteration order is the order the columns were
/// declared in the model file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Columns(Vec<(String, ColumnDefinition)>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, definition: ColumnDefinition) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = definition,
            None => self.0.push((name, definition)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, definition: ColumnDefinition) -> Self {
        self.insert(name, definition);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<ColumnDefinition> {
        let index = self.0.iter().position(|(n, _)| n == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDefinition> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDefinition)> {
        self.0.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same columns with the same definitions, regardless of order
    pub fn same_set(&self, other: &Columns) -> bool {
        self.len() == other.len() && self.iter().all(|(name, def)| other.get(name) == Some(def))
    }
}

impl TryFrom<Map<String, Value>> for Columns {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut columns = Columns::new();
        for (name, value) in map {
            columns.insert(name, serde_json::from_value(value)?);
        }
        Ok(columns)
    }
}

impl Serialize for Columns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, definition) in &self.0 {
            map.serialize_entry(name, definition)?;
        }
        map.end()
    }
}

impl FromIterator<(String, ColumnDefinition)> for Columns {
    fn from_iter<T: IntoIterator<Item = (String, ColumnDefinition)>>(iter: T) -> Self {
        let mut columns = Columns::new();
        for (name, definition) in iter {
            columns.insert(name, definition);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_nullable_unless_explicitly_false() {
        assert!(ColumnDefinition::new("STRING").is_nullable());
        assert!(!ColumnDefinition::new("STRING").not_null().is_nullable());

        let mut def = ColumnDefinition::new("STRING");
        def.allow_null = Some(true);
        assert!(def.is_nullable());
    }

    #[test]
    fn test_deserialize_keeps_unknown_keys() {
        let def: ColumnDefinition = serde_json::from_value(json!({
            "type": "INTEGER",
            "allowNull": false,
            "primaryKey": true,
            "default": 18
        }))
        .unwrap();

        assert_eq!(def.data_type, "INTEGER");
        assert_eq!(def.allow_null, Some(false));
        assert_eq!(def.extra.get("primaryKey"), Some(&json!(true)));
        assert_eq!(def.default_value, Some(DefaultValue::Number(18.into())));
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let result: Result<ColumnDefinition, _> = serde_json::from_value(json!({ "unique": true }));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_value_variants() {
        let parse = |v: Value| -> DefaultValue { serde_json::from_value(v).unwrap() };
        assert_eq!(parse(json!(true)), DefaultValue::Bool(true));
        assert_eq!(parse(json!("now")), DefaultValue::Text("now".into()));
        assert!(parse(json!("now")).is_now());
        assert_eq!(parse(json!(["a"])), DefaultValue::Json(json!(["a"])));
        assert_eq!(parse(json!(null)), DefaultValue::Null);
    }

    #[test]
    fn test_explicit_null_default_is_kept() {
        let def: ColumnDefinition = serde_json::from_value(json!({ "type": "TEXT", "default": null })).unwrap();
        assert_eq!(def.default_value, Some(DefaultValue::Null));
        assert_ne!(def, ColumnDefinition::new("TEXT"));
        assert_eq!(serde_json::to_value(&def).unwrap(), json!({ "type": "TEXT", "default": null }));

        let absent: ColumnDefinition = serde_json::from_value(json!({ "type": "TEXT" })).unwrap();
        assert_eq!(absent.default_value, None);
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let parse = |v: Value| -> ColumnDefinition { serde_json::from_value(v).unwrap() };
        assert_eq!(
            parse(json!({ "type": "INTEGER", "default": 18 })),
            parse(json!({ "type": "INTEGER", "default": 18.0 }))
        );
        assert_eq!(
            parse(json!({ "type": "DECIMAL", "validate": { "min": [0, 1] } })),
            parse(json!({ "type": "DECIMAL", "validate": { "min": [0.0, 1.0] } }))
        );
        assert_ne!(
            parse(json!({ "type": "INTEGER", "default": 18 })),
            parse(json!({ "type": "INTEGER", "default": 18.5 }))
        );
        assert_ne!(
            parse(json!({ "type": "INTEGER", "default": 18 })),
            parse(json!({ "type": "INTEGER", "default": "18" }))
        );
    }

    #[test]
    fn test_enum_values_required() {
        assert!(ColumnDefinition::new("ENUM").validate_enum_values().is_err());
        assert!(ColumnDefinition::new("ENUM")
            .values(Vec::<String>::new())
            .validate_enum_values()
            .is_err());
        assert!(ColumnDefinition::new("ENUM")
            .values(["draft", "published"])
            .validate_enum_values()
            .is_ok());
        assert!(ColumnDefinition::new("STRING").validate_enum_values().is_ok());
    }

    #[test]
    fn test_columns_keep_declaration_order() {
        let columns: Columns = serde_json::from_str(
            r#"{ "zeta": { "type": "STRING" }, "alpha": { "type": "INTEGER" }, "mid": { "type": "DATE" } }"#,
        )
        .unwrap();

        assert_eq!(columns.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);

        let round_trip = serde_json::to_string(&columns).unwrap();
        assert!(round_trip.find("zeta").unwrap() < round_trip.find("alpha").unwrap());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut columns = Columns::new()
            .with("a", ColumnDefinition::new("STRING"))
            .with("b", ColumnDefinition::new("STRING"));
        columns.insert("a", ColumnDefinition::new("TEXT"));

        assert_eq!(columns.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(columns.get("a").unwrap().data_type, "TEXT");
    }

    #[test]
    fn test_same_set_ignores_order() {
        let left = Columns::new()
            .with("a", ColumnDefinition::new("STRING"))
            .with("b", ColumnDefinition::new("INTEGER"));
        let right = Columns::new()
            .with("b", ColumnDefinition::new("INTEGER"))
            .with("a", ColumnDefinition::new("STRING"));

        assert!(left.same_set(&right));
        assert!(!left.same_set(&Columns::new().with("a", ColumnDefinition::new("STRING"))));
    }
}
