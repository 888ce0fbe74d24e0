//! Database abstraction layer for news-report.
//!
//! Reports talk to the database through two traits: a `Connector` that
//! opens connections and the `DatabaseClient` each connection exposes.

pub mod mock;
mod postgres;
mod types;

pub use mock::{ScriptedDatabase, ScriptedFailure};
pub use postgres::{PostgresClient, PostgresConnector};
pub use types::{QueryResult, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for an open database connection.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Executes a SQL query and returns all rows in server order.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}

/// Opens database connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>>;
}
