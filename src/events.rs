use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Lifecycle notifications published while a page is being scraped
///
/// These are observability only: publishing never blocks and nobody waits
/// on a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrapeEvent {
    ScrapeStart {
        url: String,
    },
    ResponseReceived {
        url: String,
        /// HTTP status, when the backend exposes one
        status: Option<u16>,
    },
    HtmlParsed {
        url: String,
    },
    DataSaved {
        url: String,
        filename: String,
    },
    ScrapeEnd {
        url: String,
    },
    ScrapeError {
        url: String,
        error: String,
    },
}

impl ScrapeEvent {
    pub fn url(&self) -> &str {
        match self {
            ScrapeEvent::ScrapeStart { url }
            | ScrapeEvent::ResponseReceived { url, .. }
            | ScrapeEvent::HtmlParsed { url }
            | ScrapeEvent::DataSaved { url, .. }
            | ScrapeEvent::ScrapeEnd { url }
            | ScrapeEvent::ScrapeError { url, .. } => url,
        }
    }
}

/// Fan-out publisher for [`ScrapeEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScrapeEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to every current subscriber
    ///
    /// Having no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: ScrapeEvent) {
        ::log::trace!("Publishing {:?}", event);
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScrapeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Spawns a task that writes every event on `bus` to the log
///
/// The task ends when every sender of the bus has been dropped.
pub fn spawn_event_logger(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => log_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    ::log::warn!("Event logger lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        ::log::debug!("Event logger stopped");
    })
}

fn log_event(event: &ScrapeEvent) {
    match event {
        ScrapeEvent::ScrapeStart { url } => ::log::info!("Scraping started for: {}", url),
        ScrapeEvent::ResponseReceived { url, status } => match status {
            Some(status) => ::log::info!("Response received for: {} Status: {}", url, status),
            None => ::log::info!("Response received for: {}", url),
        },
        ScrapeEvent::HtmlParsed { url } => ::log::info!("HTML parsed for: {}", url),
        ScrapeEvent::DataSaved { filename, .. } => {
            ::log::info!("Data saved to file: {}", filename)
        }
        ScrapeEvent::ScrapeEnd { url } => ::log::info!("Scraping ended for: {}", url),
        ScrapeEvent::ScrapeError { url, error } => {
            ::log::error!("Scraping error for: {} Error: {}", url, error)
        }
    }
}
