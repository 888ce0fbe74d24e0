//! news-report - reports on a news site's articles, authors, and access log.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod report;
