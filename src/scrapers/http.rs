use crate::config::AppConfig;
use crate::events::{EventBus, ScrapeEvent};
use crate::parsers::Parser;
use crate::results::ExtractionResult;
use crate::scrapers::{ScrapeFailure, Scraper, persist_result, with_lifecycle};
use crate::utils::scrape_timeout;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::path::PathBuf;

/// Scraper that fetches pages with a plain HTTP GET
pub struct HttpScraper {
    client: reqwest::Client,
    base_timeout_ms: u64,
    output_dir: Option<PathBuf>,
}

impl HttpScraper {
    pub fn new(config: &AppConfig) -> Result<Self, ScrapeFailure> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_timeout_ms: config.timeout_ms,
            output_dir: config.output_dir.clone(),
        })
    }

    async fn fetch(&self, url: &str, events: &EventBus) -> Result<ExtractionResult, ScrapeFailure> {
        let timeout = scrape_timeout(self.base_timeout_ms, url);
        ::log::debug!("GET {} (timeout {:?})", url, timeout);

        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        events.publish(ScrapeEvent::ResponseReceived {
            url: url.to_string(),
            status: Some(status.as_u16()),
        });

        if !status.is_success() {
            return Err(ScrapeFailure::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await?;

        let result = Parser::parse_with_content_type(&body, url, content_type.as_deref());
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
impl Scraper for HttpScraper {
    async fn scrape(
        &self,
        url: &str,
        events: &EventBus,
    ) -> Result<ExtractionResult, ScrapeFailure> {
        with_lifecycle(url, events, self.fetch(url, events)).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
