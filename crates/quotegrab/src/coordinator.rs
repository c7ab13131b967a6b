//! Coordinator loop
//!
//! The single owner of dedup state. It takes text items from the fetcher
//! pool one at a time, fingerprints them, and writes the new ones to the
//! fingerprint log and the text log. It also prints a status line every
//! report period and decides when the run is over.
//!
//! Three event sources are multiplexed without priority: incoming items,
//! report ticks and the shutdown token. The run ends when the duplicate
//! streak reaches the configured limit or the token is cancelled.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quotegrab_common::{Fingerprint, GrabError, Result};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::CollectorConfig;
use crate::report::{Report, RunSummary, StopReason};
use crate::store::FingerprintStore;

/// Written after every accepted item in the text log
pub const TEXT_SEPARATOR: &str = "\n\n\n";

/// What happened to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// New text, written to both logs
    Accepted,
    /// Already seen, streak below the limit
    Duplicate { streak: u64 },
    /// Already seen, and the streak just reached the limit
    LimitReached,
}

pub struct Coordinator {
    store: FingerprintStore,
    text_log: File,
    text_path: PathBuf,
    dup_limit: u64,
    report_period: Duration,

    dup_streak: u64,
    period_received: u64,
    accepted: u64,
    duplicates: u64,
    last_report: Option<Report>,
}

impl Coordinator {
    /// Load the fingerprint log and open both log files.
    pub fn open(config: &CollectorConfig) -> Result<Self> {
        let store = FingerprintStore::open(&config.hash_file)?;
        Self::new(store, &config.quotes_file, config.dup_limit, config.report_period)
    }

    pub fn new(
        store: FingerprintStore,
        text_path: impl AsRef<Path>,
        dup_limit: u64,
        report_period: Duration,
    ) -> Result<Self> {
        let text_path = text_path.as_ref().to_path_buf();
        let text_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&text_path)
            .map_err(|e| GrabError::text_log(&text_path, e))?;

        Ok(Self {
            store,
            text_log,
            text_path,
            dup_limit,
            report_period,
            dup_streak: 0,
            period_received: 0,
            accepted: 0,
            duplicates: 0,
            last_report: None,
        })
    }

    /// Process one text item.
    pub fn handle_item(&mut self, text: &str) -> Result<ItemOutcome> {
        self.period_received += 1;

        let fp = Fingerprint::of(text);
        if self.store.contains(&fp) {
            self.duplicates += 1;
            self.dup_streak += 1;
            debug!(fingerprint = %fp, streak = self.dup_streak, "Duplicate item");

            if self.dup_streak >= self.dup_limit {
                return Ok(ItemOutcome::LimitReached);
            }
            return Ok(ItemOutcome::Duplicate {
                streak: self.dup_streak,
            });
        }

        // Memory first, then the fingerprint log, then the text itself.
        self.store.record(fp)?;
        self.text_log
            .write_all(format!("{text}{TEXT_SEPARATOR}").as_bytes())
            .map_err(|e| GrabError::text_log(&self.text_path, e))?;

        self.accepted += 1;
        self.dup_streak = 0;
        debug!(fingerprint = %fp, "Accepted new item");

        Ok(ItemOutcome::Accepted)
    }

    /// Build the status report for the period just ended and start a new one.
    pub fn take_report(&mut self) -> Report {
        let report = Report::new(
            self.store.len(),
            self.dup_streak,
            self.period_received,
            self.report_period,
        );
        self.period_received = 0;
        self.last_report = Some(report);
        report
    }

    pub fn summary(&self, reason: StopReason) -> RunSummary {
        RunSummary {
            reason,
            total: self.store.len(),
            accepted: self.accepted,
            duplicates: self.duplicates,
            last_report: self.last_report,
        }
    }

    pub fn dup_streak(&self) -> u64 {
        self.dup_streak
    }

    /// Run until the duplicate limit is reached or `shutdown` is cancelled.
    ///
    /// A failed write to either log ends the run with that error.
    pub async fn run(
        mut self,
        mut items: mpsc::Receiver<String>,
        shutdown: CancellationToken,
    ) -> Result<RunSummary> {
        let mut ticker = interval_at(Instant::now() + self.report_period, self.report_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            known = self.store.len(),
            dup_limit = self.dup_limit,
            "Collecting"
        );

        let reason = loop {
            if shutdown.is_cancelled() {
                break StopReason::Interrupted;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break StopReason::Interrupted,
                item = items.recv() => {
                    let Some(text) = item else {
                        break StopReason::SourceClosed;
                    };
                    if self.handle_item(&text)? == ItemOutcome::LimitReached {
                        break StopReason::DuplicateLimit;
                    }
                },
                _ = ticker.tick() => {
                    self.take_report().log();
                },
            }
        };

        let summary = self.summary(reason);
        summary.log();
        Ok(summary)
    }
}
