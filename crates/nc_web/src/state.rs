use nc_scrappers::{CrawlScheduler, Crawler};
use std::sync::Arc;

pub struct AppState {
    pub crawler: Crawler,
    pub scheduler: Arc<CrawlScheduler>,
    api_key: String,
}

impl AppState {
    pub fn new(crawler: Crawler, scheduler: Arc<CrawlScheduler>, api_key: impl Into<String>) -> Self {
        Self {
            crawler,
            scheduler,
            api_key: api_key.into(),
        }
    }

    /// Plain string comparison against the shared secret. An empty secret matches nothing.
    // TODO: compare against a stored hash once keys are issued per client.
    pub fn api_key_matches(&self, provided: Option<&str>) -> bool {
        !self.api_key.is_empty() && provided == Some(self.api_key.as_str())
    }
}
