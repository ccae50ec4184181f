use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "Tech";

/// A stored article. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub category: String,
    pub crawled_at: DateTime<Utc>,
}

/// An article as found on a listing page, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateArticle {
    pub title: String,
    pub url: String,
    pub category: Option<String>,
}

impl CandidateArticle {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: None,
        }
    }

    /// Stamps the candidate for insertion.
    pub fn into_new_article(self, crawled_at: DateTime<Utc>) -> NewArticle {
        NewArticle {
            title: self.title,
            url: self.url,
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            crawled_at,
        }
    }
}

/// An article ready to be staged, still without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub category: String,
    pub crawled_at: DateTime<Utc>,
}

impl NewArticle {
    pub fn with_id(self, id: i64) -> Article {
        Article {
            id,
            title: self.title,
            url: self.url,
            category: self.category,
            crawled_at: self.crawled_at,
        }
    }
}

/// Offset/limit window over the stored articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Counts reported by one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlOutcome {
    pub inserted: usize,
    pub found: usize,
}
