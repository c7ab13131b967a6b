//! Text sources polled by the fetch workers
//!
//! A [`TextSource`] turns one attempt into either extracted text or a
//! [`FetchError`]. Callers make no distinction between error kinds: any
//! failure simply means "no item this attempt".

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::config::SourceConfig;

/// Errors from a single fetch attempt
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    Status(StatusCode),

    #[error("No element matched the selector")]
    NoMatch,

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
}

/// One fetch-and-extract primitive, shared by all workers
#[async_trait]
pub trait TextSource: Send + Sync + 'static {
    async fn fetch_text(&self) -> Result<String, FetchError>;
}

/// Fetches a fixed page over HTTP and extracts the text under a CSS selector
pub struct HttpSource {
    client: Client,
    url: String,
    selector: Selector,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let selector = Selector::parse(&config.selector)
            .map_err(|_| FetchError::InvalidSelector(config.selector.clone()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            selector,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextSource for HttpSource {
    async fn fetch_text(&self) -> Result<String, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let html = response.text().await?;
        extract_text(&html, &self.selector)
    }
}

/// Concatenate the text of every element matching `selector`.
///
/// The result is not trimmed; the fetch workers do that.
pub fn extract_text(html: &str, selector: &Selector) -> Result<String, FetchError> {
    let document = Html::parse_document(html);

    let mut matched = false;
    let mut text = String::new();
    for element in document.select(selector) {
        matched = true;
        text.extend(element.text());
    }

    if !matched {
        debug!("Selector matched nothing");
        return Err(FetchError::NoMatch);
    }

    Ok(text)
}
