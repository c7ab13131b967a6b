//! quotegrab library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Polls one web page with a pool of concurrent fetchers and keeps every text
//! fragment it has not seen before. Deduplication uses a 16-byte content
//! fingerprint persisted in an append-only log, so restarts pick up where the
//! previous run stopped. A run ends after a configurable number of
//! consecutive duplicates, or on Ctrl+C.
//!
//! # Modules
//!
//! - [`source`]: fetch-and-extract primitive (`reqwest` + `scraper`)
//! - [`fetcher`]: the concurrent worker pool
//! - [`store`]: fingerprint set and its on-disk log
//! - [`coordinator`]: the single loop owning all dedup state
//! - [`report`]: status lines and run summaries
//! - [`shutdown`]: signal handling
//!
//! # Example
//!
//! ```no_run
//! use quotegrab::{collect, config::CollectorConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CollectorConfig::default();
//!     let summary = collect(&config, CancellationToken::new()).await?;
//!     tracing::info!(total = summary.total, "Done");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod fetcher;
pub mod report;
pub mod shutdown;
pub mod source;
pub mod store;

use std::sync::Arc;

use quotegrab_common::{GrabError, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::CollectorConfig;
use coordinator::Coordinator;
use fetcher::FetcherPool;
use report::RunSummary;
use source::{HttpSource, TextSource};

/// Run a full collection against the configured HTTP source.
pub async fn collect(config: &CollectorConfig, shutdown: CancellationToken) -> Result<RunSummary> {
    let source = HttpSource::new(&config.source).map_err(|e| GrabError::config(e.to_string()))?;
    info!(url = source.url(), selector = %config.source.selector, "Polling source");
    collect_from(config, Arc::new(source), shutdown).await
}

/// Run a full collection against any text source.
///
/// Both logs are opened before any worker starts, so a bad path fails the
/// run without touching the network.
pub async fn collect_from<S: TextSource>(
    config: &CollectorConfig,
    source: Arc<S>,
    shutdown: CancellationToken,
) -> Result<RunSummary> {
    config.validate()?;

    let coordinator = Coordinator::open(config)?;
    let workers = shutdown.child_token();
    let (pool, items) =
        FetcherPool::spawn(source, config.workers, config.retry_delay, workers.clone());

    let result = coordinator.run(items, shutdown).await;

    workers.cancel();
    pool.abandon();
    result
}
