//! Plain-text rendering of report rows.

use super::rows::{ArticleViews, AuthorViews, ErrorDay};
use chrono::NaiveDate;
use std::fmt::Write;

/// Formats a count with `,` between groups of three digits.
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `July 17, 2016`
pub fn format_day(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

/// Formats a percentage with at most three decimals and no trailing zeros.
pub fn format_percent(percent: f64) -> String {
    let fixed = format!("{percent:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

pub fn render_popular_articles(limit: u32, rows: &[ArticleViews]) -> String {
    let mut out = format!("The {limit} most popular articles of all time are:\n");
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. \"{}\" — {} views.",
            rank + 1,
            row.title,
            format_count(row.views)
        );
    }
    out
}

pub fn render_popular_authors(rows: &[AuthorViews]) -> String {
    let mut out = String::from("The most popular article authors of all time are:\n");
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} — {} views.",
            rank + 1,
            row.name,
            format_count(row.views)
        );
    }
    out
}

pub fn render_error_days(threshold_percent: f64, rows: &[ErrorDay]) -> String {
    let mut out = format!(
        "Days with more than {}% of requests that lead to an error:\n",
        format_percent(threshold_percent)
    );
    for row in rows {
        let _ = writeln!(out, "{} — {:.2}% errors", format_day(row.day), row.rate);
    }
    out
}
