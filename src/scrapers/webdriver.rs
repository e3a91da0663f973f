use crate::config::AppConfig;
use crate::events::{EventBus, ScrapeEvent};
use crate::parsers::{Parser, ParserType};
use crate::results::ExtractionResult;
use crate::scrapers::{ScrapeFailure, Scraper, persist_result, with_lifecycle};
use crate::utils::scrape_timeout;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::path::PathBuf;
use tokio::time::timeout;

/// Well-known WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Scraper that renders pages in a browser driven over WebDriver
///
/// Each scrape opens its own session and closes it afterwards.
pub struct WebDriverScraper {
    webdriver_url: String,
    base_timeout_ms: u64,
    output_dir: Option<PathBuf>,
}

impl WebDriverScraper {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            base_timeout_ms: config.timeout_ms,
            output_dir: config.output_dir.clone(),
        }
    }

    async fn fetch(&self, url: &str, events: &EventBus) -> Result<ExtractionResult, ScrapeFailure> {
        let limit = scrape_timeout(self.base_timeout_ms, url);

        let client = match timeout(limit, connect_to_webdriver(&self.webdriver_url)).await {
            Ok(client) => client?,
            Err(_) => return Err(ScrapeFailure::Timeout),
        };

        let source = timeout(limit, load_source(&client, url)).await;

        // Close the session whatever happened to the page
        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        let html = source.map_err(|_| ScrapeFailure::Timeout)??;
        events.publish(ScrapeEvent::ResponseReceived {
            url: url.to_string(),
            status: None,
        });

        let result = Parser::parse(&html, url, ParserType::Html);
        events.publish(ScrapeEvent::HtmlParsed {
            url: url.to_string(),
        });

        if let Some(dir) = &self.output_dir {
            persist_result(dir, &result, events).await;
        }

        Ok(result)
    }
}

#[async_trait]
impl Scraper for WebDriverScraper {
    async fn scrape(
        &self,
        url: &str,
        events: &EventBus,
    ) -> Result<ExtractionResult, ScrapeFailure> {
        with_lifecycle(url, events, self.fetch(url, events)).await
    }

    fn name(&self) -> &'static str {
        "webdriver"
    }
}

/// Navigates to `url` and returns the rendered page source
async fn load_source(client: &Client, url: &str) -> Result<String, ScrapeFailure> {
    ::log::debug!("WebDriver navigating to {}", url);
    client.goto(url).await.map_err(|e| navigation_error(e, "accessing", url))?;
    client
        .source()
        .await
        .map_err(|e| navigation_error(e, "getting source for", url))
}

/// Connects to the WebDriver instance, falling back to well-known ports
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, ScrapeFailure> {
    let first_error = match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(ScrapeFailure::WebDriver(format!(
        "no WebDriver server reachable: {}",
        first_error
    )))
}

fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &str) -> ScrapeFailure {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    ScrapeFailure::WebDriver(navigation_message(context, url, &error.to_string()))
}

/// Failure text for a navigation error with every copy of `url` removed
fn navigation_message(context: &str, url: &str, error: &str) -> String {
    format!("failed {} page: {}", context, error.replace(url, "<page>"))
}
