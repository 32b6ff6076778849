//! Execute an entity query from HTTP input
//!
//! Query-string keys and JSON body keys are filter names, except the
//! reserved `limit` and `as_table`.

use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::query::{Entity, FilterValue, Filters, HgncQuery, Limit, QueryError, QueryOutput};

const LIMIT_KEY: &str = "limit";
const AS_TABLE_KEY: &str = "as_table";

/// An untyped entity query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub entity: Entity,
    pub filters: Filters,
    pub limit: Limit,
    pub as_table: bool,
}

impl QueryRequest {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            filters: Filters::new(),
            limit: Limit::Unbounded,
            as_table: false,
        }
    }

    /// Build from query-string pairs
    ///
    /// A key given once is a scalar; a repeated key is a set.
    pub fn from_pairs(entity: Entity, pairs: Vec<(String, String)>) -> Result<Self, QueryError> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            grouped.entry(key).or_default().push(value);
        }

        let mut request = Self::new(entity);
        for (key, mut values) in grouped {
            match key.as_str() {
                LIMIT_KEY => request.limit = single(&key, values)?.parse()?,
                AS_TABLE_KEY => request.as_table = parse_flag(&single(&key, values)?)?,
                _ => {
                    let value = if values.len() == 1 {
                        FilterValue::Text(values.remove(0))
                    } else {
                        FilterValue::TextSet(values)
                    };
                    request.filters.insert(key, value);
                },
            }
        }

        Ok(request)
    }

    /// Build from a JSON object body; null is an empty request
    pub fn from_json(entity: Entity, body: Value) -> Result<Self, QueryError> {
        let mut request = Self::new(entity);
        let fields = match body {
            Value::Null => return Ok(request),
            Value::Object(fields) => fields,
            _ => {
                return Err(QueryError::InvalidRequest(
                    "request body must be a JSON object".to_string(),
                ))
            },
        };

        for (key, value) in fields {
            match key.as_str() {
                LIMIT_KEY => request.limit = Limit::from_json(&value)?,
                AS_TABLE_KEY => {
                    request.as_table = match value {
                        Value::Null => false,
                        Value::Bool(b) => b,
                        other => {
                            return Err(QueryError::InvalidRequest(format!(
                                "as_table must be a boolean, found {}",
                                other
                            )))
                        },
                    }
                },
                _ => {
                    if let Some(filter) = FilterValue::from_json(&key, &value)? {
                        request.filters.insert(key, filter);
                    }
                },
            }
        }

        Ok(request)
    }
}

/// Run `request` against the pool
pub async fn handle(pool: SqlitePool, request: QueryRequest) -> Result<QueryOutput<Value>, QueryError> {
    HgncQuery::new(pool)
        .run(request.entity, &request.filters, request.limit, request.as_table)
        .await
}

fn single(key: &str, mut values: Vec<String>) -> Result<String, QueryError> {
    if values.len() > 1 {
        return Err(QueryError::InvalidRequest(format!("'{}' given more than once", key)));
    }
    values
        .pop()
        .ok_or_else(|| QueryError::InvalidRequest(format!("'{}' has no value", key)))
}

fn parse_flag(value: &str) -> Result<bool, QueryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(QueryError::InvalidRequest(format!(
            "as_table must be true or false, found '{}'",
            other
        ))),
    }
}
