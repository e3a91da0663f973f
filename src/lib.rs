#![allow(clippy::too_many_arguments)]

// Re-export modules
pub mod cache;
pub mod config;
pub mod events;
pub mod handler;
pub mod pagination;
pub mod parsers;
pub mod render;
pub mod results;
pub mod scrapers;
pub mod server;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use cache::ResultCache;
pub use handler::{RequestHandler, ScrapeEnvelope, ScrapeError};
pub use pagination::PaginationViewModel;
pub use results::ExtractionResult;
