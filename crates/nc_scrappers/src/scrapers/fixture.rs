use async_trait::async_trait;
use nc_core::CandidateArticle;
use tracing::warn;

use super::listing::parse_listing;
use super::utils::parse_url;
use super::Fetcher;

/// Built-in listing page: three well-formed articles and one without a title.
pub const FIXTURE_HTML: &str = r#"
<html><body>
    <article><a href="/post/1"><h2 class="title">Why async crawlers win</h2></a></article>
    <article><a href="/post/2"><h2 class="title">SQLite and sqlx in practice</h2></a></article>
    <article><a href="/post/draft"><span>Untitled draft</span></a></article>
    <article><a href="/post/3"><h2 class="title">Rate limiting and deployment with axum</h2></a></article>
</body></html>
"#;

/// Serves a fixed page instead of going to the network.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    html: String,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::with_html(FIXTURE_HTML)
    }

    pub fn with_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

impl Default for FixtureFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, locator: &str) -> Vec<CandidateArticle> {
        match parse_url(locator) {
            Ok(base) => parse_listing(&self.html, Some(&base)),
            Err(e) => {
                warn!("Cannot resolve fixture links against {}: {}", locator, e);
                Vec::new()
            }
        }
    }
}
