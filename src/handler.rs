use crate::cache::{CacheStats, ResultCache};
use crate::events::EventBus;
use crate::results::ExtractionResult;
use crate::scrapers::{ScrapeFailure, Scraper};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Broad category of a failed scrape request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing, malformed or non-http(s) URL; the scraper is never called
    InvalidInput,
    Timeout,
    NotFound,
    Forbidden,
    /// Any other scraper failure
    ScrapeFailed,
}

/// User-facing error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

/// Errors returned by [`RequestHandler::scrape`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("URL missing")]
    MissingUrl,

    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("bad scheme: {0}")]
    BadScheme(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("scrape failed: {0}")]
    ScrapeFailed(String),
}

impl ScrapeError {
    /// Maps a scraper failure onto the error taxonomy
    pub fn from_failure(failure: &ScrapeFailure) -> Self {
        let message = failure.to_string();
        match classify_failure(failure) {
            ErrorKind::Timeout => ScrapeError::Timeout(message),
            ErrorKind::NotFound => ScrapeError::NotFound(message),
            ErrorKind::Forbidden => ScrapeError::Forbidden(message),
            ErrorKind::ScrapeFailed | ErrorKind::InvalidInput => ScrapeError::ScrapeFailed(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::MissingUrl | ScrapeError::BadFormat(_) | ScrapeError::BadScheme(_) => {
                ErrorKind::InvalidInput
            }
            ScrapeError::Timeout(_) => ErrorKind::Timeout,
            ScrapeError::NotFound(_) => ErrorKind::NotFound,
            ScrapeError::Forbidden(_) => ErrorKind::Forbidden,
            ScrapeError::ScrapeFailed(_) => ErrorKind::ScrapeFailed,
        }
    }

    /// HTTP status code reported for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::Timeout => 408,
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::ScrapeFailed => 500,
        }
    }

    /// The `{error, details}` pair shown to users
    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            ScrapeError::MissingUrl => ("URL missing", "Please provide a URL to scrape"),
            ScrapeError::BadFormat(_) => ("Invalid URL", "Invalid URL format"),
            ScrapeError::BadScheme(_) => ("Invalid URL", "Protocol must be http or https"),
            ScrapeError::Timeout(_) => ("Timeout", "The page took too long to respond"),
            ScrapeError::NotFound(_) => ("Page not found", "The requested page does not exist"),
            ScrapeError::Forbidden(_) => ("Access denied", "The site blocks scraping access"),
            ScrapeError::ScrapeFailed(_) => (
                "Scraping error",
                "Unable to scrape this URL. Check that it is accessible.",
            ),
        };
        ErrorBody {
            error: error.to_string(),
            details: details.to_string(),
        }
    }
}

/// Classifies a scraper failure
///
/// Typed failures are mapped directly. Everything else falls back to
/// [`classify_message`] on the failure text.
pub fn classify_failure(failure: &ScrapeFailure) -> ErrorKind {
    match failure {
        ScrapeFailure::Timeout => ErrorKind::Timeout,
        ScrapeFailure::HttpStatus(404) => ErrorKind::NotFound,
        ScrapeFailure::HttpStatus(403) => ErrorKind::Forbidden,
        other => classify_message(&other.to_string()),
    }
}

/// Case-insensitive substring classification of a failure message
///
/// Checked in order: `timeout`, `404`, `403`.
pub fn classify_message(message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    if message.contains("timeout") {
        ErrorKind::Timeout
    } else if message.contains("404") {
        ErrorKind::NotFound
    } else if message.contains("403") {
        ErrorKind::Forbidden
    } else {
        ErrorKind::ScrapeFailed
    }
}

/// Extracts the `url` field of a JSON request body
///
/// A missing field, `null`, a non-string or an empty string all count as a
/// missing URL.
pub fn url_from_json(body: &serde_json::Value) -> Result<&str, ScrapeError> {
    match body.get("url").and_then(serde_json::Value::as_str) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(ScrapeError::MissingUrl),
    }
}

/// Checks that `url` is an absolute http or https URL
pub fn validate_url(url: &str) -> Result<Url, ScrapeError> {
    if url.is_empty() {
        return Err(ScrapeError::MissingUrl);
    }

    let parsed = Url::parse(url).map_err(|e| ScrapeError::BadFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::BadScheme(other.to_string())),
    }
}

/// Successful scrape response: the extraction plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeEnvelope {
    #[serde(flatten)]
    pub result: ExtractionResult,

    pub from_cache: bool,
}

/// Answers scrape requests from the cache or by calling the scraper
///
/// The cache lock is never held across the scraper call, so two concurrent
/// requests for the same uncached URL both scrape and the last write wins.
pub struct RequestHandler {
    cache: Mutex<ResultCache>,
    scraper: Arc<dyn Scraper>,
    events: EventBus,
}

impl RequestHandler {
    pub fn new(scraper: Arc<dyn Scraper>, cache: ResultCache, events: EventBus) -> Self {
        Self {
            cache: Mutex::new(cache),
            scraper,
            events,
        }
    }

    /// Bus the scraper publishes lifecycle notifications on
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Scrape `url`, answering from the cache when possible
    pub async fn scrape(&self, url: &str) -> Result<ScrapeEnvelope, ScrapeError> {
        validate_url(url)?;

        let cached = self.cache.lock().await.get(url).cloned();
        if let Some(result) = cached {
            ::log::info!("Serving {} from cache", url);
            return Ok(ScrapeEnvelope {
                result,
                from_cache: true,
            });
        }

        let result = self.scraper.scrape(url, &self.events).await.map_err(|failure| {
            let err = ScrapeError::from_failure(&failure);
            ::log::warn!("Scrape of {} failed ({:?}): {}", url, err.kind(), failure);
            err
        })?;

        self.cache.lock().await.set(url, result.clone());

        Ok(ScrapeEnvelope {
            result,
            from_cache: false,
        })
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScrapeEvent;
    use crate::test_support::StubScraper;

    fn handler(stub: &Arc<StubScraper>) -> RequestHandler {
        RequestHandler::new(stub.clone(), ResultCache::new(), EventBus::default())
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url(""), Err(ScrapeError::MissingUrl));
        assert!(matches!(
            validate_url("ftp://x.com"),
            Err(ScrapeError::BadScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(ScrapeError::BadFormat(_))
        ));
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/a?b=c").is_ok());

        for bad in ["", "ftp://x.com", "not a url"] {
            assert_eq!(validate_url(bad).unwrap_err().kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_url_from_json() {
        use serde_json::json;
        assert_eq!(
            url_from_json(&json!({"url": "https://a.com"})),
            Ok("https://a.com")
        );
        for body in [
            json!({}),
            json!({"url": null}),
            json!({"url": 42}),
            json!({"url": ["https://a.com"]}),
            json!({"url": ""}),
        ] {
            assert_eq!(url_from_json(&body), Err(ScrapeError::MissingUrl));
        }
    }

    #[test]
    fn test_classify_message() {
        assert_eq!(classify_message("Request timeout after 30s"), ErrorKind::Timeout);
        assert_eq!(classify_message("Error 404: page not found"), ErrorKind::NotFound);
        assert_eq!(classify_message("HTTP 403 Forbidden"), ErrorKind::Forbidden);
        assert_eq!(classify_message("TIMEOUT"), ErrorKind::Timeout);
        assert_eq!(classify_message("connection refused"), ErrorKind::ScrapeFailed);
        // Order matters when several markers appear
        assert_eq!(classify_message("timeout fetching /404"), ErrorKind::Timeout);
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(classify_failure(&ScrapeFailure::Timeout), ErrorKind::Timeout);
        assert_eq!(
            classify_failure(&ScrapeFailure::HttpStatus(404)),
            ErrorKind::NotFound
        );
        assert_eq!(
            classify_failure(&ScrapeFailure::HttpStatus(403)),
            ErrorKind::Forbidden
        );
        assert_eq!(
            classify_failure(&ScrapeFailure::HttpStatus(500)),
            ErrorKind::ScrapeFailed
        );
        assert_eq!(
            classify_failure(&ScrapeFailure::Request("operation timeout".to_string())),
            ErrorKind::Timeout
        );
        assert_eq!(
            classify_failure(&ScrapeFailure::WebDriver("dns error".to_string())),
            ErrorKind::ScrapeFailed
        );
    }

    #[test]
    fn test_status_codes_and_bodies() {
        assert_eq!(ScrapeError::MissingUrl.status_code(), 400);
        assert_eq!(ScrapeError::BadScheme("ftp".into()).status_code(), 400);
        assert_eq!(ScrapeError::Timeout(String::new()).status_code(), 408);
        assert_eq!(ScrapeError::NotFound(String::new()).status_code(), 404);
        assert_eq!(ScrapeError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(ScrapeError::ScrapeFailed(String::new()).status_code(), 500);

        assert_eq!(ScrapeError::MissingUrl.body().error, "URL missing");
        assert_eq!(ScrapeError::Timeout(String::new()).body().error, "Timeout");
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let stub = Arc::new(StubScraper::ok());
        let handler = handler(&stub);
        let mut rx = handler.events().subscribe();

        let first = handler.scrape("https://example.com").await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(stub.calls(), 1);
        while rx.try_recv().is_ok() {}

        let second = handler.scrape("https://example.com").await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.result, first.result);
        assert_eq!(stub.calls(), 1);
        // A cache hit publishes nothing
        assert!(rx.try_recv().is_err());

        let stats = handler.cache_stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.key_count, 1);
    }

    #[tokio::test]
    async fn test_cache_key_is_the_raw_input() {
        let stub = Arc::new(StubScraper::ok());
        let handler = handler(&stub);

        handler.scrape("https://example.com").await.unwrap();
        let other = handler.scrape("https://example.com/").await.unwrap();
        assert!(!other.from_cache);
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_scraper() {
        let stub = Arc::new(StubScraper::ok());
        let handler = handler(&stub);

        for bad in ["", "ftp://x.com", "not a url"] {
            let err = handler.scrape(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert_eq!(stub.calls(), 0);
        // Rejected input does not touch the cache counters
        assert_eq!(handler.cache_stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_failures_are_classified_and_not_cached() {
        let cases = [
            (
                ScrapeFailure::Request("Request timeout after 30s".to_string()),
                ErrorKind::Timeout,
            ),
            (
                ScrapeFailure::Request("Error 404: page not found".to_string()),
                ErrorKind::NotFound,
            ),
            (ScrapeFailure::HttpStatus(403), ErrorKind::Forbidden),
            (
                ScrapeFailure::Parse("bad markup".to_string()),
                ErrorKind::ScrapeFailed,
            ),
        ];

        for (failure, kind) in cases {
            let stub = Arc::new(StubScraper::failing(failure));
            let handler = handler(&stub);
            let err = handler.scrape("https://example.com").await.unwrap_err();
            assert_eq!(err.kind(), kind);
            assert_eq!(handler.cache_stats().await.key_count, 0);
        }
    }

    #[tokio::test]
    async fn test_url_text_does_not_drive_classification() {
        for url in [
            "http://127.0.0.1:1/docs/404-guide",
            "https://example.com/403/forbidden-fruit",
            "https://example.com/timeout-settings",
        ] {
            let stub = Arc::new(StubScraper::failing(ScrapeFailure::Request(
                "error sending request: client error (Connect): Connection refused".to_string(),
            )));
            let handler = handler(&stub);
            let err = handler.scrape(url).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ScrapeFailed);
            assert_eq!(err.status_code(), 500);
        }
    }

    #[tokio::test]
    async fn test_failure_publishes_error_event() {
        let stub = Arc::new(StubScraper::failing(ScrapeFailure::Timeout));
        let handler = handler(&stub);
        let mut rx = handler.events().subscribe();

        handler.scrape("https://example.com").await.unwrap_err();

        let mut saw_error = false;
        while let Ok(event) = rx.try_recv() {
            saw_error |= matches!(event, ScrapeEvent::ScrapeError { .. });
        }
        assert!(saw_error);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_rescrape() {
        let stub = Arc::new(StubScraper::ok());
        let handler = handler(&stub);

        handler.scrape("https://example.com").await.unwrap();
        handler.clear_cache().await;
        assert_eq!(handler.cache_stats().await, CacheStats::default());

        let again = handler.scrape("https://example.com").await.unwrap();
        assert!(!again.from_cache);
        assert_eq!(stub.calls(), 2);
    }

    #[test]
    fn test_envelope_is_flat() {
        let envelope = ScrapeEnvelope {
            result: crate::test_support::sample_result("https://a.com", 3),
            from_cache: true,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["fromCache"], true);
        assert_eq!(json["url"], "https://a.com");
        assert_eq!(json["stats"]["totalParagraphs"], 3);
    }
}
