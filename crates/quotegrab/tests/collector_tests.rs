//! Integration tests for the collector
//!
//! These tests drive the whole pipeline (fetch workers, coordinator, both
//! log files) against a mock HTTP server or an in-process text source:
//! - HTML extraction over HTTP
//! - Duplicate-limit termination
//! - Restart with an existing fingerprint log
//! - Interrupt while items are in flight

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quotegrab::config::{CollectorConfig, SourceConfig};
use quotegrab::report::StopReason;
use quotegrab::source::{FetchError, HttpSource, TextSource};
use quotegrab::{collect, collect_from, store};
use quotegrab_common::{Fingerprint, FINGERPRINT_LEN};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn page(quote: &str) -> String {
    format!(
        r#"<html><body>
             <div class="header">Moderation</div>
             <div class="fi_text">
               {quote}
             </div>
           </body></html>"#
    )
}

async fn serve_quote(quote: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moderation/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(quote)))
        .mount(&server)
        .await;
    server
}

fn test_config(dir: &TempDir, url: String, dup_limit: u64) -> CollectorConfig {
    CollectorConfig {
        workers: 2,
        report_period: Duration::from_secs(10),
        dup_limit,
        hash_file: dir.path().join("hash.bin"),
        quotes_file: dir.path().join("quotes.txt"),
        retry_delay: Duration::from_millis(10),
        source: SourceConfig {
            url,
            ..SourceConfig::default()
        },
    }
}

fn source_config(url: String) -> SourceConfig {
    SourceConfig {
        url,
        ..SourceConfig::default()
    }
}

fn quotes_in(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .split("\n\n\n")
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// HTTP source
// ============================================================================

#[tokio::test]
async fn test_http_source_extracts_selected_text() {
    let server = serve_quote("Nobody knows I <i>still</i> sleep with a nightlight.").await;
    let source = HttpSource::new(&source_config(format!("{}/moderation/", server.uri()))).unwrap();

    let text = source.fetch_text().await.unwrap();
    assert_eq!(text.trim(), "Nobody knows I still sleep with a nightlight.");
}

#[tokio::test]
async fn test_http_source_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let source = HttpSource::new(&source_config(server.uri())).unwrap();

    let err = source.fetch_text().await.unwrap_err();
    assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 503));
}

#[tokio::test]
async fn test_http_source_reports_missing_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>maintenance</p>"))
        .mount(&server)
        .await;
    let source = HttpSource::new(&source_config(server.uri())).unwrap();

    assert!(matches!(source.fetch_text().await, Err(FetchError::NoMatch)));
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_constant_page_stops_at_duplicate_limit() {
    let dir = TempDir::new().unwrap();
    let server = serve_quote("the same confession every time").await;
    let config = test_config(&dir, format!("{}/moderation/", server.uri()), 3);

    let summary = collect(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.reason, StopReason::DuplicateLimit);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.duplicates, 3);
    assert_eq!(quotes_in(&config.quotes_file), vec!["the same confession every time"]);
    assert_eq!(std::fs::read(&config.hash_file).unwrap().len(), FINGERPRINT_LEN);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_rejects_previously_seen_item() {
    let dir = TempDir::new().unwrap();
    let server = serve_quote("f2").await;
    let config = test_config(&dir, format!("{}/moderation/", server.uri()), 2);

    let mut log = Vec::new();
    for item in ["f1", "f2", "f3"] {
        log.extend_from_slice(Fingerprint::of(item).as_bytes());
    }
    std::fs::write(&config.hash_file, &log).unwrap();

    let summary = collect(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.reason, StopReason::DuplicateLimit);
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.total, 3);
    assert_eq!(std::fs::read(&config.hash_file).unwrap(), log);
    assert!(quotes_in(&config.quotes_file).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_second_run_continues_first_runs_log() {
    let dir = TempDir::new().unwrap();
    let server = serve_quote("first run").await;
    let config = test_config(&dir, format!("{}/moderation/", server.uri()), 2);
    collect(&config, CancellationToken::new()).await.unwrap();

    let server = serve_quote("second run").await;
    let config = test_config(&dir, format!("{}/moderation/", server.uri()), 2);
    let summary = collect(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.accepted, 1);
    assert_eq!(quotes_in(&config.quotes_file), vec!["first run", "second run"]);
    assert_eq!(store::load(&config.hash_file).unwrap().len(), 2);
}

/// Produces a new item on every call
struct EndlessSource {
    next: AtomicU64,
}

#[async_trait]
impl TextSource for EndlessSource {
    async fn fetch_text(&self) -> Result<String, FetchError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("item number {n}"))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interrupt_leaves_valid_logs() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, "http://unused.invalid/".to_string(), 1_000_000);
    config.workers = 4;
    config.retry_delay = Duration::from_millis(1);

    let source = Arc::new(EndlessSource {
        next: AtomicU64::new(0),
    });
    let shutdown = CancellationToken::new();
    let run = tokio::spawn({
        let config = config.clone();
        let source = Arc::clone(&source);
        let shutdown = shutdown.clone();
        async move { collect_from(&config, source, shutdown).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();
    let summary = run.await.unwrap().unwrap();

    assert_eq!(summary.reason, StopReason::Interrupted);
    assert!(summary.accepted > 0);

    // Nothing is written once the run has returned
    tokio::time::sleep(Duration::from_millis(50)).await;

    let hashes = std::fs::read(&config.hash_file).unwrap();
    assert_eq!(hashes.len() % FINGERPRINT_LEN, 0);
    assert_eq!((hashes.len() / FINGERPRINT_LEN) as u64, summary.accepted);

    let quotes = quotes_in(&config.quotes_file);
    assert_eq!(quotes.len() as u64, summary.accepted);

    let reloaded = store::load(&config.hash_file).unwrap();
    for quote in &quotes {
        assert!(reloaded.contains(&Fingerprint::of(quote)));
    }
}

#[tokio::test]
async fn test_unwritable_text_log_fails_before_fetching() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let mut config = test_config(&dir, server.uri(), 3);
    config.quotes_file = dir.path().join("missing-dir").join("quotes.txt");

    let result = collect(&config, CancellationToken::new()).await;

    assert!(result.is_err());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
