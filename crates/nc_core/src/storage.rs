use async_trait::async_trait;
use crate::types::{Article, NewArticle, Page};
use crate::Result;

/// A store of crawled articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Opens a fresh unit of work. Every crawl and every API request gets its own.
    async fn acquire_handle(&self) -> Result<Box<dyn StoreHandle>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// One unit of work against an [`ArticleStore`].
///
/// Staged writes become visible only through [`StoreHandle::commit`]. Dropping a
/// handle without committing discards them and releases the underlying resources.
#[async_trait]
pub trait StoreHandle: Send {
    /// Returns true if an article with this url is stored or already staged.
    async fn contains_url(&mut self, url: &str) -> Result<bool>;

    /// Stages an article for insertion. The store rejects urls that already exist
    /// at commit time; those are not counted.
    async fn stage(&mut self, article: NewArticle) -> Result<()>;

    /// Persists everything staged as one unit and returns the number of rows written.
    async fn commit(self: Box<Self>) -> Result<usize>;

    /// Reads a page of articles in storage order.
    async fn list(&mut self, page: Page) -> Result<Vec<Article>>;

    /// Total number of stored articles.
    async fn count(&mut self) -> Result<u64>;
}
