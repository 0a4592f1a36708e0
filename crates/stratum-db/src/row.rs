//! Generic result rows.

use stratum_core::{StratumError, StratumResult};

use crate::value::Value;

/// A single result row: column names paired with values.
///
/// Rows are produced by [`DatabaseBackend::query`](crate::backend::DatabaseBackend::query)
/// and looked up by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from parallel column and value lists.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Returns the value for the named column.
    pub fn get(&self, column: &str) -> StratumResult<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
            .ok_or_else(|| StratumError::Database(format!("no such column: {column}")))
    }

    /// Returns the string value for the named column.
    pub fn get_string(&self, column: &str) -> StratumResult<String> {
        match self.get(column)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(StratumError::Database(format!(
                "column {column} is not a string: {other}"
            ))),
        }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
