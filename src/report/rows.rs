//! Typed rows decoded from untyped query results.

use crate::db::{QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use chrono::NaiveDate;

/// Views of one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleViews {
    pub title: String,
    pub views: i64,
}

/// Views summed over all of an author's articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorViews {
    pub name: String,
    pub views: i64,
}

/// A day whose error percentage exceeded the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDay {
    pub day: NaiveDate,
    pub total: i64,
    pub errors: i64,
    /// Percentage of the day's requests that were errors.
    pub rate: f64,
}

/// Decoding from a single result row.
pub trait FromRow: Sized {
    const COLUMNS: usize;

    fn from_row(row: &Row) -> Result<Self>;
}

/// Decodes every row of `result`, reporting the first offending row.
pub fn decode_all<T: FromRow>(result: &QueryResult) -> Result<Vec<T>> {
    result
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != T::COLUMNS {
                return Err(ReportError::decode(format!(
                    "row {}: expected {} columns, got {}",
                    i + 1,
                    T::COLUMNS,
                    row.len()
                )));
            }
            T::from_row(row).map_err(|e| match e {
                ReportError::Decode(msg) => ReportError::decode(format!("row {}: {msg}", i + 1)),
                other => other,
            })
        })
        .collect()
}

impl FromRow for ArticleViews {
    const COLUMNS: usize = 2;

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            title: text(&row[0], "title")?,
            views: count(&row[1], "views")?,
        })
    }
}

impl FromRow for AuthorViews {
    const COLUMNS: usize = 2;

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: text(&row[0], "name")?,
            views: count(&row[1], "views")?,
        })
    }
}

impl FromRow for ErrorDay {
    const COLUMNS: usize = 4;

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            day: date(&row[0], "day")?,
            total: count(&row[1], "total")?,
            errors: count(&row[2], "errors")?,
            rate: number(&row[3], "rate")?,
        })
    }
}

fn unexpected(column: &str, expected: &str, value: &Value) -> ReportError {
    ReportError::decode(format!(
        "column '{column}': expected {expected}, got {}",
        value.type_name()
    ))
}

fn text(value: &Value, column: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(unexpected(column, "text", other)),
    }
}

fn count(value: &Value, column: &str) -> Result<i64> {
    match value {
        Value::Int(n) if *n >= 0 => Ok(*n),
        Value::Int(n) => Err(ReportError::decode(format!(
            "column '{column}': negative count {n}"
        ))),
        other => Err(unexpected(column, "int", other)),
    }
}

fn number(value: &Value, column: &str) -> Result<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(n) => Ok(*n as f64),
        other => Err(unexpected(column, "number", other)),
    }
}

fn date(value: &Value, column: &str) -> Result<NaiveDate> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            ReportError::decode(format!("column '{column}': invalid date '{s}': {e}"))
        }),
        other => Err(unexpected(column, "date", other)),
    }
}
