pub mod cli;
pub mod crawler;
pub mod ingest;
pub mod logging;
pub mod scheduler;
pub mod scrapers;

#[cfg(test)]
mod testing;

pub use cli::{handle_command, CrawlCommands};
pub use crawler::{Crawler, Trigger};
pub use ingest::ingest;
pub use logging::{init_logging, Logger};
pub use scheduler::CrawlScheduler;
pub use scrapers::{create_fetcher, Fetcher, FetcherKind, FixtureFetcher, HttpFetcher};

