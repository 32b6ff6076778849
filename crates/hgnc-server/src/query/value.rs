//! Filter values and their coercion to column types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::descriptor::{FieldType, FilterDescriptor, MatchKind};
use super::QueryError;

/// Filter name -> value
pub type Filters = BTreeMap<String, FilterValue>;

/// A caller-supplied filter value
///
/// A scalar constrains the field to one value; a set constrains it to any of
/// the given values. Absence (`None` / JSON null) means no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Text(String),
    IntSet(Vec<i64>),
    TextSet(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::TextSet(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(values: Vec<i64>) -> Self {
        FilterValue::IntSet(values)
    }
}

/// A value ready to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl FilterValue {
    /// Read a JSON filter value; `Ok(None)` for null
    ///
    /// Objects, nested or mixed arrays and non-integer numbers are rejected.
    pub fn from_json(filter: &str, value: &Value) -> Result<Option<Self>, QueryError> {
        let invalid = |found: &Value| QueryError::InvalidFilterValue {
            filter: filter.to_string(),
            expected: "a string, integer, boolean or array of strings or integers",
            found: describe_json(found),
        };

        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(FilterValue::Bool(*b))),
            Value::Number(n) => n
                .as_i64()
                .map(|n| Some(FilterValue::Int(n)))
                .ok_or_else(|| invalid(value)),
            Value::String(s) => Ok(Some(FilterValue::Text(s.clone()))),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    let texts = items.iter().filter_map(Value::as_str).map(str::to_string);
                    Ok(Some(FilterValue::TextSet(texts.collect())))
                } else if items.iter().all(|v| v.as_i64().is_some()) {
                    Ok(Some(FilterValue::IntSet(items.iter().filter_map(Value::as_i64).collect())))
                } else {
                    Err(invalid(value))
                }
            },
            Value::Object(_) => Err(invalid(value)),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FilterValue::IntSet(_) | FilterValue::TextSet(_))
    }

    /// Match kind for this value on `filter`
    pub fn match_kind(&self, filter: &FilterDescriptor) -> MatchKind {
        if self.is_set() {
            MatchKind::Membership
        } else {
            filter.kind
        }
    }

    /// Coerce to bind values of the filter's field type
    ///
    /// Scalars give one value, sets give one value per element. An empty set
    /// is rejected.
    pub fn coerce(&self, filter: &FilterDescriptor) -> Result<Vec<SqlValue>, QueryError> {
        let field_type = filter.field_type;
        match self {
            FilterValue::IntSet(items) if items.is_empty() => Err(empty_set(filter)),
            FilterValue::TextSet(items) if items.is_empty() => Err(empty_set(filter)),
            FilterValue::IntSet(items) => items
                .iter()
                .map(|n| coerce_int(*n, filter))
                .collect(),
            FilterValue::TextSet(items) => items
                .iter()
                .map(|s| coerce_text(s, filter))
                .collect(),
            FilterValue::Int(n) => Ok(vec![coerce_int(*n, filter)?]),
            FilterValue::Text(s) => Ok(vec![coerce_text(s, filter)?]),
            FilterValue::Bool(b) => match field_type {
                FieldType::Boolean => Ok(vec![SqlValue::Bool(*b)]),
                _ => Err(mismatch(filter, self)),
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            FilterValue::Bool(b) => format!("boolean {}", b),
            FilterValue::Int(n) => format!("integer {}", n),
            FilterValue::Text(s) => format!("string '{}'", s),
            FilterValue::IntSet(items) => format!("array of {} integers", items.len()),
            FilterValue::TextSet(items) => format!("array of {} strings", items.len()),
        }
    }
}

fn coerce_int(n: i64, filter: &FilterDescriptor) -> Result<SqlValue, QueryError> {
    match filter.field_type {
        FieldType::Integer => Ok(SqlValue::Int(n)),
        FieldType::Text => Ok(SqlValue::Text(n.to_string())),
        FieldType::Boolean => match n {
            0 => Ok(SqlValue::Bool(false)),
            1 => Ok(SqlValue::Bool(true)),
            _ => Err(mismatch(filter, &FilterValue::Int(n))),
        },
    }
}

fn coerce_text(s: &str, filter: &FilterDescriptor) -> Result<SqlValue, QueryError> {
    match filter.field_type {
        FieldType::Text => Ok(SqlValue::Text(s.to_string())),
        FieldType::Integer => s
            .trim()
            .parse()
            .map(SqlValue::Int)
            .map_err(|_| mismatch(filter, &FilterValue::from(s))),
        FieldType::Boolean => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(SqlValue::Bool(true)),
            "false" | "0" => Ok(SqlValue::Bool(false)),
            _ => Err(mismatch(filter, &FilterValue::from(s))),
        },
    }
}

fn mismatch(filter: &FilterDescriptor, value: &FilterValue) -> QueryError {
    QueryError::InvalidFilterValue {
        filter: filter.name.to_string(),
        expected: filter.field_type.describe(),
        found: value.describe(),
    }
}

fn empty_set(filter: &FilterDescriptor) -> QueryError {
    QueryError::InvalidFilterValue {
        filter: filter.name.to_string(),
        expected: "a non-empty array",
        found: "an empty array".to_string(),
    }
}

fn describe_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array of mixed or nested values".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::descriptor::Entity;
    use serde_json::json;

    fn filter(entity: Entity, name: &str) -> &'static FilterDescriptor {
        entity.descriptor().filter(name).unwrap()
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FilterValue::from_json("symbol", &json!(null)).unwrap(), None);
        assert_eq!(
            FilterValue::from_json("symbol", &json!("A1BG")).unwrap(),
            Some(FilterValue::from("A1BG"))
        );
        assert_eq!(
            FilterValue::from_json("identifier", &json!([5, 250])).unwrap(),
            Some(FilterValue::IntSet(vec![5, 250]))
        );
        assert_eq!(
            FilterValue::from_json("symbol", &json!([])).unwrap(),
            Some(FilterValue::TextSet(vec![]))
        );
    }

    #[test]
    fn test_from_json_rejects_unsupported_shapes() {
        for value in [json!({"a": 1}), json!([[1]]), json!([1, "a"]), json!(1.5), json!([true])] {
            let err = FilterValue::from_json("symbol", &value).unwrap_err();
            assert!(
                matches!(err, QueryError::InvalidFilterValue { ref filter, .. } if filter == "symbol"),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_untagged_deserialize() {
        let value: FilterValue = serde_json::from_value(json!(["A1BG", "ADH1B"])).unwrap();
        assert_eq!(value, FilterValue::from(vec!["A1BG", "ADH1B"]));
        assert!(serde_json::from_value::<FilterValue>(json!({"symbol": "A1BG"})).is_err());
    }

    #[test]
    fn test_match_kind() {
        let symbol = filter(Entity::Hgnc, "symbol");
        let identifier = filter(Entity::Hgnc, "identifier");

        assert_eq!(FilterValue::from("A1BG").match_kind(symbol), MatchKind::Like);
        assert_eq!(FilterValue::from(5i64).match_kind(identifier), MatchKind::Equals);
        assert_eq!(
            FilterValue::from(vec![5i64, 250]).match_kind(identifier),
            MatchKind::Membership
        );
    }

    #[test]
    fn test_coerce_from_query_string_text() {
        let identifier = filter(Entity::Hgnc, "identifier");
        assert_eq!(
            FilterValue::from("5").coerce(identifier).unwrap(),
            vec![SqlValue::Int(5)]
        );

        let previous = filter(Entity::AliasSymbol, "is_previous_symbol");
        assert_eq!(
            FilterValue::from("true").coerce(previous).unwrap(),
            vec![SqlValue::Bool(true)]
        );
        assert_eq!(
            FilterValue::from(0i64).coerce(previous).unwrap(),
            vec![SqlValue::Bool(false)]
        );

        let entrez = filter(Entity::Hgnc, "entrez");
        assert_eq!(
            FilterValue::from(1i64).coerce(entrez).unwrap(),
            vec![SqlValue::Text("1".to_string())]
        );
    }

    #[test]
    fn test_coerce_rejects_mismatches() {
        let identifier = filter(Entity::Hgnc, "identifier");
        assert!(FilterValue::from("five").coerce(identifier).is_err());
        assert!(FilterValue::from(true).coerce(identifier).is_err());
        assert!(FilterValue::from(vec!["5", "x"]).coerce(identifier).is_err());

        let previous = filter(Entity::AliasSymbol, "is_previous_symbol");
        assert!(FilterValue::from(2i64).coerce(previous).is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        let symbol = filter(Entity::Hgnc, "symbol");
        let err = FilterValue::TextSet(vec![]).coerce(symbol).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilterValue { expected: "a non-empty array", .. }));
    }
}
