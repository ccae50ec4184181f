use nc_core::{ArticleStore, CrawlOutcome, Result};
use std::fmt;
use std::sync::Arc;

use crate::ingest::ingest;
use crate::logging::Logger;
use crate::scrapers::Fetcher;

/// Who asked for a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Scheduled,
    Cli,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Manual => write!(f, "manual"),
            Trigger::Scheduled => write!(f, "scheduled"),
            Trigger::Cli => write!(f, "cli"),
        }
    }
}

/// Everything a crawl needs, built once at startup and cloned into the web
/// state and the scheduler.
#[derive(Clone)]
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn ArticleStore>,
    target_url: String,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn ArticleStore>, target_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            store,
            target_url: target_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ArticleStore> {
        &self.store
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Fetches the target and stores the new articles.
    ///
    /// Nothing found is not an error and leaves storage alone: no handle is
    /// acquired. Storage failures are logged and returned; they never panic.
    pub async fn run(&self, trigger: Trigger) -> Result<CrawlOutcome> {
        let logger = Logger::new().with_prefix(format!("[{}]", trigger));
        logger.info(&format!(
            "🦗 Crawling {} with the {} fetcher",
            self.target_url,
            self.fetcher.name()
        ));

        let candidates = self.fetcher.fetch(&self.target_url).await;
        let found = candidates.len();
        if found == 0 {
            logger.warn("Found no articles");
            return Ok(CrawlOutcome::default());
        }

        let result = async {
            let handle = self.store.acquire_handle().await?;
            ingest(handle, candidates).await
        }
        .await;

        match result {
            Ok(inserted) => {
                logger.info(&format!("✨ Found {} articles, stored {} new", found, inserted));
                Ok(CrawlOutcome { inserted, found })
            }
            Err(e) => {
                logger.error(&format!("Crawl failed after finding {} articles: {}", found, e));
                Err(e)
            }
        }
    }
}
