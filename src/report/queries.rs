//! SQL text for the three reports.
//!
//! A log entry is a view of an article only when its path is exactly
//! `/article/` followed by the slug.

use crate::config::ErrorRule;

/// Join condition between `log` and `articles`.
const ARTICLE_PATH_MATCH: &str = "log.path = '/article/' || articles.slug";

/// Most viewed articles, at most `limit` rows.
pub fn popular_articles(limit: u32) -> String {
    format!(
        "SELECT articles.title, COUNT(*) AS views \
         FROM articles \
         JOIN log ON {ARTICLE_PATH_MATCH} \
         GROUP BY articles.title \
         ORDER BY views DESC, articles.title \
         LIMIT {limit}"
    )
}

/// Every author with at least one viewed article.
pub fn popular_authors() -> String {
    format!(
        "SELECT authors.name, COUNT(*) AS views \
         FROM authors \
         JOIN articles ON articles.author = authors.id \
         JOIN log ON {ARTICLE_PATH_MATCH} \
         GROUP BY authors.name \
         ORDER BY views DESC, authors.name"
    )
}

/// Days whose error percentage is strictly above `threshold_percent`.
///
/// Columns: `day` (date), `total`, `errors`, `rate` (percent, 3 decimals).
pub fn error_days(rule: ErrorRule, threshold_percent: f64) -> String {
    let predicate = rule.predicate();
    format!(
        "WITH daily AS ( \
             SELECT time::date AS day, \
                    COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE {predicate}) AS errors \
             FROM log \
             GROUP BY day \
         ) \
         SELECT day, total, errors, \
                ROUND(100.0 * errors / total, 3)::float8 AS rate \
         FROM daily \
         WHERE total > 0 AND 100.0 * errors / total > {threshold_percent} \
         ORDER BY rate DESC, day"
    )
}
