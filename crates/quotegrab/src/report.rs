//! Periodic status reports and the final run summary

use std::fmt;
use std::time::Duration;

use quotegrab_common::logging::STATUS_TARGET;
use tracing::info;

/// One reporting period's status line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    /// Fingerprints known, including those loaded at startup
    pub total: usize,
    /// Current run of consecutive duplicates
    pub dup_streak: u64,
    /// Items received during the period
    pub received: u64,
    /// Items received per second over the period
    pub rate: f64,
}

impl Report {
    pub fn new(total: usize, dup_streak: u64, received: u64, period: Duration) -> Self {
        Self {
            total,
            dup_streak,
            received,
            rate: rate(received, period),
        }
    }

    pub fn log(&self) {
        info!(
            target: STATUS_TARGET,
            total = self.total,
            dup_streak = self.dup_streak,
            rate = self.rate,
            "{}",
            self
        );
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total {} / Duplicates {} ({:.1} items/sec)",
            self.total, self.dup_streak, self.rate
        )
    }
}

/// Items per second over `period`. Zero for an empty period.
pub fn rate(count: u64, period: Duration) -> f64 {
    let secs = period.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    count as f64 / secs
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of consecutive duplicates was reached
    DuplicateLimit,
    /// The shutdown token was cancelled
    Interrupted,
    /// Every producer went away
    SourceClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::DuplicateLimit => write!(f, "duplicate limit reached"),
            StopReason::Interrupted => write!(f, "interrupted"),
            StopReason::SourceClosed => write!(f, "source closed"),
        }
    }
}

/// Outcome of one coordinator run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    /// Fingerprints known at the end of the run
    pub total: usize,
    /// New items written during this run
    pub accepted: u64,
    /// Duplicates rejected during this run
    pub duplicates: u64,
    /// The most recent status report, if a period elapsed
    pub last_report: Option<Report>,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            target: STATUS_TARGET,
            reason = %self.reason,
            total = self.total,
            accepted = self.accepted,
            duplicates = self.duplicates,
            "Stopping: {}. Total records: {}",
            self.reason,
            self.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_over_period() {
        assert_eq!(rate(20, Duration::from_secs(10)), 2.0);
        assert_eq!(rate(0, Duration::from_secs(10)), 0.0);
        assert_eq!(rate(5, Duration::from_secs(2)), 2.5);
    }

    #[test]
    fn test_zero_period_rate() {
        assert_eq!(rate(3, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_report_line() {
        let report = Report::new(120, 4, 20, Duration::from_secs(10));
        assert_eq!(report.rate, 2.0);
        assert_eq!(report.to_string(), "Total 120 / Duplicates 4 (2.0 items/sec)");
    }
}
