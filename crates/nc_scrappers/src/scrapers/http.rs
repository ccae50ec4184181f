use async_trait::async_trait;
use nc_core::{CandidateArticle, Result};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::listing::parse_listing;
use super::utils::parse_url;
use super::Fetcher;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a listing page over HTTP and parses it.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newscrawl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the page body and the url it was finally served from.
    async fn get_html(&self, url: Url) -> Result<(String, Url)> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let final_url = response.url().clone();
        let html = response.text().await?;
        Ok((html, final_url))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, locator: &str) -> Vec<CandidateArticle> {
        let url = match parse_url(locator) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot fetch {}: {}", locator, e);
                return Vec::new();
            }
        };

        match self.get_html(url).await {
            Ok((html, base)) => {
                let articles = parse_listing(&html, Some(&base));
                debug!("Parsed {} articles from {}", articles.len(), base);
                articles
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", locator, e);
                Vec::new()
            }
        }
    }
}
