//! Test doubles shared by the crawler and scheduler tests.

use async_trait::async_trait;
use nc_core::{Article, ArticleStore, CandidateArticle, Error, NewArticle, Page, Result, StoreHandle};
use nc_storage::MemoryStorage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::scrapers::Fetcher;

pub fn candidates(n: u32) -> Vec<CandidateArticle> {
    (1..=n)
        .map(|i| CandidateArticle::new(format!("Article {i}"), format!("https://example.com/post/{i}")))
        .collect()
}

/// Returns fixed candidates, optionally after a delay, and reports every call.
pub struct ScriptedFetcher {
    articles: Vec<CandidateArticle>,
    delay: Option<Duration>,
    calls: mpsc::UnboundedSender<()>,
}

impl ScriptedFetcher {
    pub fn new(articles: Vec<CandidateArticle>) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { articles, delay: None, calls }, rx)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, _locator: &str) -> Vec<CandidateArticle> {
        let _ = self.calls.send(());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.articles.clone()
    }
}

/// Memory store that counts handles and can be told to fail.
#[derive(Clone)]
pub struct FailingStore {
    pub inner: MemoryStorage,
    pub handles: Arc<AtomicUsize>,
    fail_acquire: bool,
    fail_commit: bool,
}

impl FailingStore {
    pub fn healthy() -> Self {
        Self {
            inner: MemoryStorage::new(),
            handles: Arc::new(AtomicUsize::new(0)),
            fail_acquire: false,
            fail_commit: false,
        }
    }

    pub fn unreachable() -> Self {
        Self { fail_acquire: true, ..Self::healthy() }
    }

    pub fn failing_commit() -> Self {
        Self { fail_commit: true, ..Self::healthy() }
    }

    pub fn handles_acquired(&self) -> usize {
        self.handles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for FailingStore {
    async fn acquire_handle(&self) -> Result<Box<dyn StoreHandle>> {
        self.handles.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire {
            return Err(Error::Database("connection refused".to_string()));
        }
        Ok(Box::new(FailingHandle {
            inner: self.inner.acquire_handle().await?,
            fail_commit: self.fail_commit,
        }))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

struct FailingHandle {
    inner: Box<dyn StoreHandle>,
    fail_commit: bool,
}

#[async_trait]
impl StoreHandle for FailingHandle {
    async fn contains_url(&mut self, url: &str) -> Result<bool> {
        self.inner.contains_url(url).await
    }

    async fn stage(&mut self, article: NewArticle) -> Result<()> {
        self.inner.stage(article).await
    }

    async fn commit(self: Box<Self>) -> Result<usize> {
        if self.fail_commit {
            return Err(Error::Database("disk I/O error".to_string()));
        }
        self.inner.commit().await
    }

    async fn list(&mut self, page: Page) -> Result<Vec<Article>> {
        self.inner.list(page).await
    }

    async fn count(&mut self) -> Result<u64> {
        self.inner.count().await
    }
}
