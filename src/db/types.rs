//! Query result types.
//!
//! Untyped rows as the database returns them; reports decode these into
//! their own row structs.

use chrono::NaiveDate;
use std::time::Duration;

/// Rows returned by one query, with how long the server took.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Rows of data, in the order the server returned them.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    pub execution_time: Duration,
}

impl QueryResult {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            execution_time: Duration::ZERO,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single column value, limited to the types the report queries select.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
}

impl Value {
    /// Short type label used in decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "text",
            Value::Date(_) => "date",
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
