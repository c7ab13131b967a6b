//! Collector configuration

use quotegrab_common::{GrabError, Result};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Collector Configuration Constants
// ============================================================================

/// Default page polled by the fetch workers.
pub const DEFAULT_SOURCE_URL: &str = "http://vpustotu.ru/moderation/";

/// Default CSS selector for the text region of the page.
pub const DEFAULT_SELECTOR: &str = ".fi_text";

/// Default seconds between status reports.
pub const DEFAULT_REPORT_PERIOD_SECS: u64 = 10;

/// Default number of consecutive duplicates before the run stops.
pub const DEFAULT_DUP_LIMIT: u64 = 500;

/// Default fingerprint log path.
pub const DEFAULT_HASH_FILE: &str = "hash.bin";

/// Default text log path.
pub const DEFAULT_QUOTES_FILE: &str = "quotes.txt";

/// Default pause after every fetch attempt, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of available processing units, falling back to one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Everything the collector needs to run
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub workers: usize,
    pub report_period: Duration,
    pub dup_limit: u64,
    pub hash_file: PathBuf,
    pub quotes_file: PathBuf,
    pub retry_delay: Duration,
    pub source: SourceConfig,
}

/// Where and how the fetch workers read text
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub selector: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            user_agent: format!("quotegrab/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            report_period: Duration::from_secs(DEFAULT_REPORT_PERIOD_SECS),
            dup_limit: DEFAULT_DUP_LIMIT,
            hash_file: PathBuf::from(DEFAULT_HASH_FILE),
            quotes_file: PathBuf::from(DEFAULT_QUOTES_FILE),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            source: SourceConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(GrabError::config("worker count must be at least 1"));
        }

        if self.report_period < Duration::from_secs(1) {
            return Err(GrabError::config("report period must be at least 1 second"));
        }

        if self.dup_limit == 0 {
            return Err(GrabError::config("duplicate limit must be at least 1"));
        }

        if self.source.url.trim().is_empty() {
            return Err(GrabError::config("source URL cannot be empty"));
        }

        if self.source.selector.trim().is_empty() {
            return Err(GrabError::config("selector cannot be empty"));
        }

        if self.hash_file == self.quotes_file {
            return Err(GrabError::config(format!(
                "fingerprint log and text log must be different files (both are {})",
                self.hash_file.display()
            )));
        }

        Ok(())
    }
}
