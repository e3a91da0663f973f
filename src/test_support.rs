//! Test doubles shared by the unit tests

use crate::events::EventBus;
use crate::results::{ExtractionResult, Heading, HeadingLevel, Image, Link};
use crate::scrapers::{ScrapeFailure, Scraper, with_lifecycle};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result with `n` items in every section
pub fn sample_result(url: &str, n: usize) -> ExtractionResult {
    ExtractionResult::new(
        url.to_string(),
        format!("Page at {}", url),
        None,
        (0..n)
            .map(|i| Heading {
                level: HeadingLevel::H2,
                text: format!("heading {}", i),
            })
            .collect(),
        (0..n).map(|i| format!("paragraph {}", i)).collect(),
        (0..n)
            .map(|i| Link {
                url: format!("{}/link/{}", url, i),
                text: Some(format!("link {}", i)),
            })
            .collect(),
        (0..n)
            .map(|i| Image {
                src: format!("{}/img/{}.png", url, i),
                alt: None,
            })
            .collect(),
    )
}

/// Scraper that never touches the network and counts its calls
pub struct StubScraper {
    outcome: Result<usize, ScrapeFailure>,
    calls: AtomicUsize,
}

impl StubScraper {
    /// Succeeds with three items per section
    pub fn ok() -> Self {
        Self::with_items(3)
    }

    pub fn with_items(n: usize) -> Self {
        Self {
            outcome: Ok(n),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: ScrapeFailure) -> Self {
        Self {
            outcome: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scraper for StubScraper {
    async fn scrape(
        &self,
        url: &str,
        events: &EventBus,
    ) -> Result<ExtractionResult, ScrapeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        with_lifecycle(url, events, async move {
            outcome.map(|n| sample_result(url, n))
        })
        .await
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
