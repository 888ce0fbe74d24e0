//! news-report - prints the popular-articles, popular-authors, and error-day reports.

use news_report::cli::Cli;
use news_report::config::Config;
use news_report::db::PostgresConnector;
use news_report::error::Result;
use news_report::logging;
use news_report::report::ReportRunner;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!(category = e.category(), "{e}");
        println!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = cli.resolve_config(Config::load_from_file(&config_path)?)?;

    info!("Connection: {}", config.connection.display_string());

    let runner = ReportRunner::new(PostgresConnector::new(config.connection), config.report);
    let mut stdout = std::io::stdout().lock();
    runner.run(&cli.reports(), &mut stdout).await
}
