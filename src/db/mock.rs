//! Scripted database for testing.
//!
//! Returns canned results for queries containing a registered SQL fragment
//! and keeps count of the connections it hands out.

use super::{Connector, DatabaseClient, QueryResult};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Where a scripted failure is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// `connect` fails.
    Connect,
    /// `execute_query` fails for queries matching the fragment.
    Query(&'static str),
}

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// A `Connector` that serves canned results.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDatabase {
    responses: Arc<Vec<(String, QueryResult)>>,
    failure: Option<ScriptedFailure>,
    executed: Arc<Mutex<Vec<String>>>,
    counters: Arc<Counters>,
}

impl ScriptedDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `result` for any query whose text contains `fragment`.
    ///
    /// Earlier registrations win when several fragments match.
    pub fn respond(mut self, fragment: impl Into<String>, result: QueryResult) -> Self {
        Arc::make_mut(&mut self.responses).push((fragment.into(), result));
        self
    }

    pub fn failing(mut self, failure: ScriptedFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Connections opened so far.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Connections closed so far.
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// SQL text of every query executed, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|sqls| sqls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for ScriptedDatabase {
    async fn connect(&self) -> Result<Box<dyn DatabaseClient>> {
        if self.failure == Some(ScriptedFailure::Connect) {
            return Err(ReportError::connection(
                "Database 'does_not_exist' does not exist.",
            ));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedClient {
            db: self.clone(),
            open: true,
        }))
    }
}

struct ScriptedClient {
    db: ScriptedDatabase,
    open: bool,
}

#[async_trait]
impl DatabaseClient for ScriptedClient {
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        if !self.open {
            return Err(ReportError::connection("Connection is already closed"));
        }
        if let Ok(mut executed) = self.db.executed.lock() {
            executed.push(sql.to_string());
        }

        if let Some(ScriptedFailure::Query(fragment)) = self.db.failure {
            if sql.contains(fragment) {
                return Err(ReportError::query(format!(
                    "ERROR: scripted failure for query containing '{fragment}'"
                )));
            }
        }

        self.db
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone())
            .ok_or_else(|| ReportError::query("ERROR: no scripted response for query"))
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.db.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
