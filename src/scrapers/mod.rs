pub mod http;
pub mod webdriver;

use crate::config::{AppConfig, Backend};
use crate::events::{EventBus, ScrapeEvent};
use crate::results::ExtractionResult;
use crate::utils::result_file_name;
use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpScraper;
pub use webdriver::WebDriverScraper;

/// Why a scrape failed
///
/// The typed variants let callers classify without reading the message;
/// the message-carrying variants are classified from their text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeFailure {
    #[error("Request timeout")]
    Timeout,

    #[error("Request failed with status code {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Request(String),

    #[error("Failed to parse page: {0}")]
    Parse(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

impl From<reqwest::Error> for ScrapeFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeFailure::Timeout
        } else if let Some(status) = err.status() {
            ScrapeFailure::HttpStatus(status.as_u16())
        } else {
            ScrapeFailure::Request(error_chain(&err.without_url()))
        }
    }
}

/// Joins an error and its sources into one message
///
/// Callers strip the request URL first so that classification only ever
/// sees the failure reason.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Fetches a page and extracts its structured content
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Scrape `url`, publishing lifecycle notifications on `events`
    async fn scrape(&self, url: &str, events: &EventBus)
    -> Result<ExtractionResult, ScrapeFailure>;

    /// Short backend name for logging
    fn name(&self) -> &'static str;
}

/// Builds the scraper selected by the configuration
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Scraper>, ScrapeFailure> {
    let scraper: Arc<dyn Scraper> = match config.backend {
        Backend::Http => Arc::new(HttpScraper::new(config)?),
        Backend::WebDriver => Arc::new(WebDriverScraper::new(config)),
    };
    ::log::info!("Using {} scraper backend", scraper.name());
    Ok(scraper)
}

/// Wraps one scrape with the start, error and end notifications
///
/// `scrape-end` fires whether the scrape succeeded or not.
pub(crate) async fn with_lifecycle<F>(
    url: &str,
    events: &EventBus,
    scrape: F,
) -> Result<ExtractionResult, ScrapeFailure>
where
    F: Future<Output = Result<ExtractionResult, ScrapeFailure>>,
{
    events.publish(ScrapeEvent::ScrapeStart {
        url: url.to_string(),
    });

    let result = scrape.await;

    if let Err(e) = &result {
        events.publish(ScrapeEvent::ScrapeError {
            url: url.to_string(),
            error: e.to_string(),
        });
    }
    events.publish(ScrapeEvent::ScrapeEnd {
        url: url.to_string(),
    });

    result
}

/// Writes `result` as JSON into `dir` and announces the file
///
/// A failed write is logged and otherwise ignored.
pub(crate) async fn persist_result(dir: &Path, result: &ExtractionResult, events: &EventBus) {
    match save_result(dir, result).await {
        Ok(path) => events.publish(ScrapeEvent::DataSaved {
            url: result.url.clone(),
            filename: path.display().to_string(),
        }),
        Err(e) => ::log::warn!("Failed to save result for {}: {}", result.url, e),
    }
}

async fn save_result(dir: &Path, result: &ExtractionResult) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(result_file_name(&result.url));
    let json = serde_json::to_vec_pretty(result)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}
