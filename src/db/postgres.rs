//! PostgreSQL database client implementation.
//!
//! Provides `PostgresClient`, a single sqlx `PgConnection` implementing
//! `DatabaseClient`, and `PostgresConnector`, which opens one per query.

use crate::config::ConnectionConfig;
use crate::db::{Connector, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column as SqlxColumn, Connection, Row as SqlxRow, TypeInfo};
use std::time::{Duration, Instant};
use tracing::debug;

/// PostgreSQL database client owning one connection.
#[derive(Debug)]
pub struct PostgresClient {
    conn: Option<PgConnection>,
    query_timeout: Duration,
}

impl PostgresClient {
    /// Opens a connection described by `config`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let options = config.to_connect_options();
        let timeout = config.connect_timeout();

        debug!("Connecting to {}", config.display_string());

        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                ReportError::connection(format!(
                    "Connection to {} timed out after {} seconds",
                    config.display_string(),
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");

        Ok(Self {
            conn: Some(conn),
            query_timeout: config.query_timeout(),
        })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ReportError::connection("Connection is already closed"))?;

        let start = Instant::now();
        let timeout = self.query_timeout;

        let result = tokio::time::timeout(timeout, sqlx::query(sql).fetch_all(&mut *conn))
            .await
            .map_err(|_| {
                ReportError::query(format!(
                    "Query timed out after {} seconds",
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| ReportError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let rows = result.iter().map(convert_row).collect::<Result<Vec<Row>>>()?;

        Ok(QueryResult::with_rows(rows).with_execution_time(execution_time))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| ReportError::connection(format!("Failed to close connection: {e}")))?;
            debug!("Connection closed");
        }
        Ok(())
    }
}

/// Opens a fresh `PostgresClient` for every query.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    config: ConnectionConfig,
}

impl PostgresConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        let client = PostgresClient::connect(&self.config).await?;
        Ok(Box::new(client))
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Result<Row> {
    row.columns()
        .iter()
        .map(|col| convert_value(row, col.ordinal(), col.name(), col.type_info().name()))
        .collect()
}

/// Converts one column of a PgRow. Only the types the report queries select are accepted.
fn convert_value(row: &PgRow, index: usize, column: &str, type_name: &str) -> Result<Value> {
    let value = match type_name.to_uppercase().as_str() {
        "INT8" => row
            .try_get::<Option<i64>, _>(index)
            .map(|v| v.map(Value::Int)),

        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)
            .map(|v| v.map(Value::Float)),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|v| v.map(Value::Date)),

        "TEXT" | "VARCHAR" => row
            .try_get::<Option<String>, _>(index)
            .map(|v| v.map(Value::String)),

        other => return Err(unsupported_type(column, other)),
    };

    value
        .map(|v| v.unwrap_or(Value::Null))
        .map_err(|e| decode_error(column, e))
}

fn unsupported_type(column: &str, type_name: &str) -> ReportError {
    ReportError::decode(format!(
        "column '{column}': unsupported column type {type_name}"
    ))
}

fn decode_error(column: &str, error: sqlx::Error) -> ReportError {
    ReportError::decode(format!("column '{column}': {error}"))
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("the default host");
    let user = config.user.as_deref().unwrap_or("current user");
    let database = config.database_name();

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}. Check that the server is running. ({error})"
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ReportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ReportError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else {
        ReportError::connection(error.to_string())
    }
}

/// Formats a query error with Postgres detail and hint if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }

        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
