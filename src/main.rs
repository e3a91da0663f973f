use clap::Parser;
use scrape_view::config::AppConfig;
use scrape_view::events::{EventBus, spawn_event_logger};
use scrape_view::pagination::PaginationViewModel;
use scrape_view::render::ResultView;
use scrape_view::{RequestHandler, ResultCache, scrapers, server};
use std::net::SocketAddr;
use std::sync::Arc;

mod args;
use args::{Args, Command, convert_backend, convert_filter, convert_section};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load config from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    }
    .apply_env_overrides();

    if let Some(backend) = args.backend {
        config.backend = convert_backend(backend);
    }

    let scraper = match scrapers::from_config(&config) {
        Ok(scraper) => scraper,
        Err(e) => {
            ::log::error!("Failed to create scraper: {}", e);
            std::process::exit(1);
        }
    };

    let events = EventBus::default();
    let logger = spawn_event_logger(&events);
    let handler = Arc::new(RequestHandler::new(scraper, ResultCache::new(), events));

    match args.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind_addr.clone());
            let addr: SocketAddr = match bind.parse() {
                Ok(addr) => addr,
                Err(e) => {
                    ::log::error!("Invalid bind address {}: {}", bind, e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = server::serve(handler, addr).await {
                ::log::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Scrape {
            url,
            section,
            page,
            filter,
            json,
        } => {
            let start_time = std::time::Instant::now();
            let outcome = handler.scrape(&url).await;

            // Dropping the last sender lets the event logger drain and stop
            drop(handler);
            let _ = logger.await;

            let envelope = match outcome {
                Ok(envelope) => envelope,
                Err(e) => {
                    let body = e.body();
                    ::log::error!("{}: {} ({})", body.error, body.details, e);
                    std::process::exit(1);
                }
            };

            ::log::info!(
                "Scraped {} in {:.2} seconds",
                url,
                start_time.elapsed().as_secs_f64()
            );

            if json {
                match serde_json::to_string_pretty(&envelope) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        ::log::error!("Failed to serialize result: {}", e);
                        std::process::exit(1);
                    }
                }
                return;
            }

            let mut view = PaginationViewModel::for_result(&envelope.result);
            view.set_filter(convert_filter(filter));

            let rendered = match section.map(convert_section) {
                Some(section) => {
                    if page != 1 && !view.go_to(section, page) {
                        ::log::warn!("Page {} of {} is not available", page, section);
                    }
                    ResultView::new(&envelope, &view)
                        .with_focus(section)
                        .to_string()
                }
                None => ResultView::new(&envelope, &view).to_string(),
            };
            print!("{}", rendered);
        }
    }
}
