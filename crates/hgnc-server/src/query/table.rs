//! Tabular query output

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::QueryError;

/// Column names plus one value row per record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from serializable records, picking `columns` in order
    ///
    /// A column missing from a record's serialized form becomes null.
    pub fn from_records<T: Serialize>(columns: &[&str], records: &[T]) -> Result<Self, QueryError> {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut fields = match serde_json::to_value(record)? {
                Value::Object(fields) => fields,
                other => {
                    let mut fields = Map::new();
                    fields.insert("value".to_string(), other);
                    fields
                },
            };
            rows.push(
                columns
                    .iter()
                    .map(|column| fields.remove(*column).unwrap_or(Value::Null))
                    .collect(),
            );
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as column -> value maps
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Values of one column, `None` if the column does not exist
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }
}

/// Query result: entity records, or the same rows as a table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput<T> {
    Records(Vec<T>),
    Table(Table),
}

impl<T> QueryOutput<T> {
    pub fn len(&self) -> usize {
        match self {
            QueryOutput::Records(records) => records.len(),
            QueryOutput::Table(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Option<Vec<T>> {
        match self {
            QueryOutput::Records(records) => Some(records),
            QueryOutput::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            QueryOutput::Records(_) => None,
            QueryOutput::Table(table) => Some(table),
        }
    }
}
