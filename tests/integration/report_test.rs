//! Report integration tests.
//!
//! Each test seeds its own schema on the DATABASE_URL server and points the
//! reports at it through `search_path`.

use news_report::config::{ConnectionConfig, ErrorRule, ReportConfig};
use news_report::db::{DatabaseClient, PostgresClient, PostgresConnector};
use news_report::error::ReportError;
use news_report::report::{ReportKind, ReportRunner};
use std::time::{SystemTime, UNIX_EPOCH};

/// Helper to get test database URL from environment.
fn get_test_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

/// A throwaway schema holding the news tables.
struct SeededSchema {
    admin: PostgresClient,
    config: ConnectionConfig,
    schema: String,
}

impl SeededSchema {
    /// Returns `None` only when DATABASE_URL is unset; any other setup failure panics.
    async fn create() -> Option<Self> {
        let url = get_test_database_url()?;
        let base = ConnectionConfig::from_connection_string(&url)
            .expect("DATABASE_URL is not a valid connection string");
        let mut admin = PostgresClient::connect(&base)
            .await
            .expect("Failed to connect to DATABASE_URL");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let schema = format!("news_report_test_{}_{}", std::process::id(), nanos);

        let statements = [
            format!("CREATE SCHEMA {schema}"),
            format!("CREATE TABLE {schema}.authors (id integer PRIMARY KEY, name text NOT NULL)"),
            format!(
                "CREATE TABLE {schema}.articles (title text NOT NULL, slug text UNIQUE NOT NULL, \
                 author integer REFERENCES {schema}.authors (id))"
            ),
            format!("CREATE TABLE {schema}.log (path text, status text, time timestamptz)"),
            format!(
                "INSERT INTO {schema}.authors VALUES \
                 (1, 'Ursula La Multa'), (2, 'Rudolf von Treppenwitz'), (3, 'Anonymous Contributor')"
            ),
            format!(
                "INSERT INTO {schema}.articles VALUES \
                 ('A Slug', 'a-slug', 1), ('Bears', 'bears', 2), ('Candidate', 'candidate', 1), \
                 ('Dogs', 'dogs', 2), ('Suffix', 'slug', 1)"
            ),
            // July 1: 18 article requests, one of them a 404
            views(&schema, "a-slug", "200 OK", 3, "2016-07-01"),
            views(&schema, "a-slug", "404 NOT FOUND", 1, "2016-07-01"),
            views(&schema, "bears", "200 OK", 6, "2016-07-01"),
            views(&schema, "candidate", "200 OK", 5, "2016-07-01"),
            views(&schema, "dogs", "200 OK", 2, "2016-07-01"),
            views(&schema, "slug", "200 OK", 1, "2016-07-01"),
            // July 2: 100 requests, 2 not found
            requests(&schema, "404 NOT FOUND", 2, "2016-07-02"),
            requests(&schema, "200 OK", 98, "2016-07-02"),
            // July 3: 200 requests, 1 not found
            requests(&schema, "404 NOT FOUND", 1, "2016-07-03"),
            requests(&schema, "200 OK", 199, "2016-07-03"),
            // July 4: 100 requests, 2 server errors
            requests(&schema, "500 INTERNAL SERVER ERROR", 2, "2016-07-04"),
            requests(&schema, "200 OK", 98, "2016-07-04"),
            // July 5: exactly 1% not found
            requests(&schema, "404 NOT FOUND", 1, "2016-07-05"),
            requests(&schema, "200 OK", 99, "2016-07-05"),
        ];

        for sql in &statements {
            if let Err(e) = admin.execute_query(sql).await {
                panic!("Failed to seed test schema with `{sql}`: {e}");
            }
        }

        let config = ConnectionConfig {
            search_path: Some(schema.clone()),
            ..base
        };

        Some(Self {
            admin,
            config,
            schema,
        })
    }

    fn runner(&self, report: ReportConfig) -> ReportRunner<PostgresConnector> {
        ReportRunner::new(PostgresConnector::new(self.config.clone()), report)
    }

    async fn render(&self, report: ReportConfig, kinds: &[ReportKind]) -> String {
        let mut out = Vec::new();
        self.runner(report).run(kinds, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    async fn drop_schema(mut self) {
        let _ = self
            .admin
            .execute_query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .await;
        let _ = self.admin.close().await;
    }
}

fn views(schema: &str, slug: &str, status: &str, count: u32, day: &str) -> String {
    format!(
        "INSERT INTO {schema}.log (path, status, time) \
         SELECT '/article/{slug}', '{status}', timestamptz '{day} 12:00:00+00' \
         FROM generate_series(1, {count})"
    )
}

fn requests(schema: &str, status: &str, count: u32, day: &str) -> String {
    format!(
        "INSERT INTO {schema}.log (path, status, time) \
         SELECT '/', '{status}', timestamptz '{day} 12:00:00+00' \
         FROM generate_series(1, {count})"
    )
}

#[tokio::test]
async fn test_popular_articles_top_three() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let rows = db.runner(ReportConfig::default()).popular_articles().await.unwrap();
    let text = db
        .render(ReportConfig::default(), &[ReportKind::Articles])
        .await;
    db.drop_schema().await;

    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].views >= w[1].views));
    assert_eq!(
        text,
        "The 3 most popular articles of all time are:\n\
         1. \"Bears\" — 6 views.\n\
         2. \"Candidate\" — 5 views.\n\
         3. \"A Slug\" — 4 views.\n"
    );
}

#[tokio::test]
async fn test_exact_path_match_does_not_overmatch_suffix_slugs() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let report = ReportConfig {
        top_articles: 10,
        ..Default::default()
    };
    let rows = db.runner(report).popular_articles().await.unwrap();
    db.drop_schema().await;

    let suffix = rows.iter().find(|r| r.title == "Suffix").unwrap();
    assert_eq!(suffix.views, 1);
    let a_slug = rows.iter().find(|r| r.title == "A Slug").unwrap();
    assert_eq!(a_slug.views, 4);
}

#[tokio::test]
async fn test_popular_authors_covers_every_viewed_author() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let text = db
        .render(ReportConfig::default(), &[ReportKind::Authors])
        .await;
    db.drop_schema().await;

    assert_eq!(
        text,
        "The most popular article authors of all time are:\n\
         1. Ursula La Multa — 10 views.\n\
         2. Rudolf von Treppenwitz — 8 views.\n"
    );
}

#[tokio::test]
async fn test_error_days_non_ok_rule() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let rows = db.runner(ReportConfig::default()).error_days().await.unwrap();
    let text = db
        .render(ReportConfig::default(), &[ReportKind::ErrorDays])
        .await;
    db.drop_schema().await;

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.rate > 1.0 && r.total > 0));
    assert_eq!(rows[1].total, 100);
    assert_eq!(rows[1].errors, 2);
    assert_eq!(rows[1].rate, 2.0);
    assert_eq!(
        text,
        "Days with more than 1% of requests that lead to an error:\n\
         July 1, 2016 — 5.56% errors\n\
         July 2, 2016 — 2.00% errors\n\
         July 4, 2016 — 2.00% errors\n"
    );
}

#[tokio::test]
async fn test_error_days_not_found_rule_ignores_server_errors() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let report = ReportConfig {
        error_rule: ErrorRule::NotFound,
        ..Default::default()
    };
    let text = db.render(report, &[ReportKind::ErrorDays]).await;
    db.drop_schema().await;

    assert!(text.contains("July 2, 2016 — 2.00% errors"));
    assert!(!text.contains("July 4, 2016"));
    assert!(!text.contains("July 3, 2016"));
}

#[tokio::test]
async fn test_error_days_threshold_is_strict() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let non_ok = db.runner(ReportConfig::default()).error_days().await.unwrap();
    let not_found = db
        .runner(ReportConfig {
            error_rule: ErrorRule::NotFound,
            ..Default::default()
        })
        .error_days()
        .await
        .unwrap();
    db.drop_schema().await;

    let july_5 = chrono::NaiveDate::from_ymd_opt(2016, 7, 5).unwrap();
    assert!(non_ok.iter().all(|r| r.day != july_5));
    assert!(not_found.iter().all(|r| r.day != july_5));
}

#[tokio::test]
async fn test_unsupported_column_type_is_decode_error() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = db
        .runner(ReportConfig::default())
        .run_query("SELECT true AS flag")
        .await;
    db.drop_schema().await;

    let err = result.unwrap_err();
    assert!(matches!(err, ReportError::Decode(_)));
    assert!(err.to_string().contains("column 'flag'"));
}

#[tokio::test]
async fn test_reports_are_idempotent() {
    let Some(db) = SeededSchema::create().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let first = db.render(ReportConfig::default(), &ReportKind::ALL).await;
    let second = db.render(ReportConfig::default(), &ReportKind::ALL).await;
    db.drop_schema().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_database_is_connection_error() {
    let Some(url) = get_test_database_url() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let mut config = ConnectionConfig::from_connection_string(&url).unwrap();
    config.database = Some("news_report_database_that_does_not_exist".to_string());

    let runner = ReportRunner::new(PostgresConnector::new(config), ReportConfig::default());
    let mut out = Vec::new();
    let err = runner.run(&ReportKind::ALL, &mut out).await.unwrap_err();

    assert!(matches!(err, ReportError::Connection(_)));
    assert!(out.is_empty());
}
