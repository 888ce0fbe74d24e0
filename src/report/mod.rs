//! The three news-site reports and the runner that drives them.
//!
//! Each report is a one-shot cycle: open a connection, run one fixed query,
//! close the connection, decode the rows, render text.

mod format;
pub mod queries;
mod rows;

pub use format::{format_count, format_day, format_percent};
pub use rows::{decode_all, ArticleViews, AuthorViews, ErrorDay, FromRow};

use crate::config::ReportConfig;
use crate::db::{Connector, QueryResult};
use crate::error::Result;
use std::io::Write;
use tracing::{debug, info, warn};

/// The reports this tool knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    /// Most viewed articles.
    Articles,
    /// Authors ranked by total views.
    Authors,
    /// Days with an error rate above the threshold.
    ErrorDays,
}

impl ReportKind {
    /// All reports, in the order they run by default.
    pub const ALL: [ReportKind; 3] = [Self::Articles, Self::Authors, Self::ErrorDays];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Articles => "articles",
            Self::Authors => "authors",
            Self::ErrorDays => "error-days",
        }
    }
}

/// Runs reports against the database reached through `connector`.
pub struct ReportRunner<C> {
    connector: C,
    config: ReportConfig,
}

impl<C: Connector> ReportRunner<C> {
    pub fn new(connector: C, config: ReportConfig) -> Self {
        Self { connector, config }
    }

    /// Executes `sql` on a connection of its own.
    ///
    /// The connection is closed before returning, whether or not the query
    /// succeeded. A failed close is logged and does not replace the result.
    pub async fn run_query(&self, sql: &str) -> Result<QueryResult> {
        let mut client = self.connector.connect().await?;
        debug!(%sql, "Executing query");

        let result = client.execute_query(sql).await;

        if let Err(e) = client.close().await {
            warn!("Failed to close connection: {}", e);
        }

        result
    }

    /// Runs one report query and decodes its rows.
    async fn fetch<T: FromRow>(&self, kind: ReportKind, sql: &str) -> Result<Vec<T>> {
        let result = self.run_query(sql).await?;
        let rows = decode_all(&result)?;
        info!(
            report = kind.name(),
            rows = rows.len(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Report complete"
        );
        Ok(rows)
    }

    pub async fn popular_articles(&self) -> Result<Vec<ArticleViews>> {
        let sql = queries::popular_articles(self.config.top_articles);
        self.fetch(ReportKind::Articles, &sql).await
    }

    pub async fn popular_authors(&self) -> Result<Vec<AuthorViews>> {
        self.fetch(ReportKind::Authors, &queries::popular_authors()).await
    }

    pub async fn error_days(&self) -> Result<Vec<ErrorDay>> {
        let sql = queries::error_days(self.config.error_rule, self.config.error_threshold_percent);
        self.fetch(ReportKind::ErrorDays, &sql).await
    }

    /// Runs one report and returns its rendered text.
    pub async fn render(&self, kind: ReportKind) -> Result<String> {
        let text = match kind {
            ReportKind::Articles => {
                let rows = self.popular_articles().await?;
                format::render_popular_articles(self.config.top_articles, &rows)
            }
            ReportKind::Authors => format::render_popular_authors(&self.popular_authors().await?),
            ReportKind::ErrorDays => format::render_error_days(
                self.config.error_threshold_percent,
                &self.error_days().await?,
            ),
        };
        Ok(text)
    }

    /// Runs `reports` in order, writing each as soon as it is ready.
    ///
    /// Stops at the first failure; blocks already written stay written.
    pub async fn run<W: Write>(&self, reports: &[ReportKind], out: &mut W) -> Result<()> {
        for (i, kind) in reports.iter().enumerate() {
            let text = self.render(*kind).await?;
            if i > 0 {
                writeln!(out)?;
            }
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }
}
