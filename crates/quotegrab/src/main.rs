//! quotegrab - collects unique text fragments from a web page

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quotegrab::config::{
    default_workers, CollectorConfig, SourceConfig, DEFAULT_DUP_LIMIT, DEFAULT_HASH_FILE,
    DEFAULT_QUOTES_FILE, DEFAULT_REPORT_PERIOD_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_SELECTOR, DEFAULT_SOURCE_URL,
};
use quotegrab::shutdown::cancel_on_signal;
use quotegrab_common::logging::{init_logging, LogConfig, LogLevel};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quotegrab")]
#[command(author, version, about = "Poll a page and keep every text fragment not seen before")]
struct Cli {
    /// Number of concurrent fetch workers
    #[arg(short, long, env = "QUOTEGRAB_WORKERS", default_value_t = default_workers())]
    workers: usize,

    /// Seconds between status reports
    #[arg(short, long, env = "QUOTEGRAB_REPORT_PERIOD", default_value_t = DEFAULT_REPORT_PERIOD_SECS)]
    report_period: u64,

    /// Consecutive duplicates before stopping
    #[arg(short, long, env = "QUOTEGRAB_DUP_LIMIT", default_value_t = DEFAULT_DUP_LIMIT)]
    dup_limit: u64,

    /// Fingerprint log file
    #[arg(long, env = "QUOTEGRAB_HASH_FILE", default_value = DEFAULT_HASH_FILE)]
    hash_file: PathBuf,

    /// Text log file
    #[arg(long, env = "QUOTEGRAB_QUOTES_FILE", default_value = DEFAULT_QUOTES_FILE)]
    quotes_file: PathBuf,

    /// Page to poll
    #[arg(long, env = "QUOTEGRAB_URL", default_value = DEFAULT_SOURCE_URL)]
    url: String,

    /// CSS selector of the text region
    #[arg(long, env = "QUOTEGRAB_SELECTOR", default_value = DEFAULT_SELECTOR)]
    selector: String,

    /// Pause after every fetch attempt, in milliseconds
    #[arg(long, env = "QUOTEGRAB_RETRY_DELAY_MS", default_value_t = DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "QUOTEGRAB_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> CollectorConfig {
        CollectorConfig {
            workers: self.workers,
            report_period: Duration::from_secs(self.report_period),
            dup_limit: self.dup_limit,
            hash_file: self.hash_file,
            quotes_file: self.quotes_file,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            source: SourceConfig {
                url: self.url,
                selector: self.selector,
                request_timeout: Duration::from_secs(self.timeout),
                ..SourceConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("quotegrab")
        .filter_directives("hyper=warn,reqwest=warn,html5ever=warn,selectors=warn")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;

    init_logging(&log_config)?;

    let config = cli.into_config();
    config.validate().context("Invalid configuration")?;

    info!(
        workers = config.workers,
        hash_file = %config.hash_file.display(),
        quotes_file = %config.quotes_file.display(),
        "Starting quotegrab"
    );

    let shutdown = CancellationToken::new();
    cancel_on_signal(shutdown.clone());

    let summary = quotegrab::collect(&config, shutdown)
        .await
        .context("Collection failed")?;

    info!(reason = %summary.reason, "Collection complete");
    Ok(())
}
