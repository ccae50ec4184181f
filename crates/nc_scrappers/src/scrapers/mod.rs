use async_trait::async_trait;
use nc_core::{CandidateArticle, Error, Result};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod fixture;
pub mod http;
pub mod listing;

pub use fixture::FixtureFetcher;
pub use http::HttpFetcher;
pub use listing::parse_listing;

/// Turns a listing page into candidate articles.
///
/// Fetchers never fail: an unreachable or slow source yields an empty list and a
/// warning in the logs.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Returns the articles linked from `locator`, in document order.
    async fn fetch(&self, locator: &str) -> Vec<CandidateArticle>;
}

/// Which fetcher the process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetcherKind {
    #[default]
    Http,
    Fixture,
}

impl FromStr for FetcherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "fixture" => Ok(Self::Fixture),
            other => Err(Error::Config(format!(
                "Unknown fetcher: {}. Available fetchers: http, fixture",
                other
            ))),
        }
    }
}

pub fn create_fetcher(kind: FetcherKind, timeout: Duration) -> Result<Arc<dyn Fetcher>> {
    Ok(match kind {
        FetcherKind::Http => Arc::new(HttpFetcher::with_timeout(timeout)?),
        FetcherKind::Fixture => Arc::new(FixtureFetcher::new()),
    })
}

/// Common utilities for fetchers
pub(crate) mod utils {
    use super::*;
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Ok(Url::parse(url)?)
    }

    /// Resolves `href` against the page it was found on.
    pub fn absolute_url(base: Option<&Url>, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let resolved = match base {
            Some(base) => base.join(href).ok()?,
            None => Url::parse(href).ok()?,
        };
        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }
}
