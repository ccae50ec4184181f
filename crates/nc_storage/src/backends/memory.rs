use async_trait::async_trait;
use nc_core::{Article, ArticleStore, NewArticle, Page, Result, StoreHandle};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MemoryStore {
    articles: Vec<Article>,
    urls: HashSet<String>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            urls: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Inserts unless the url is taken. The url set is the unique index.
    pub fn insert(&mut self, article: NewArticle) -> bool {
        if !self.urls.insert(article.url.clone()) {
            return false;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.articles.push(article.with_id(id));
        true
    }

    pub fn page(&self, page: Page) -> Vec<Article> {
        self.articles
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-local store, used for tests and `memory://` runs.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn all(&self) -> Vec<Article> {
        self.store.read().await.articles.clone()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn acquire_handle(&self) -> Result<Box<dyn StoreHandle>> {
        Ok(Box::new(MemoryHandle {
            store: self.store.clone(),
            staged: Vec::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub struct MemoryHandle {
    store: Arc<RwLock<MemoryStore>>,
    staged: Vec<NewArticle>,
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn contains_url(&mut self, url: &str) -> Result<bool> {
        if self.staged.iter().any(|a| a.url == url) {
            return Ok(true);
        }
        Ok(self.store.read().await.contains_url(url))
    }

    async fn stage(&mut self, article: NewArticle) -> Result<()> {
        self.staged.push(article);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<usize> {
        let MemoryHandle { store, staged } = *self;
        let mut store = store.write().await;
        let mut written = 0;
        for article in staged {
            if store.insert(article) {
                written += 1;
            }
        }
        Ok(written)
    }

    async fn list(&mut self, page: Page) -> Result<Vec<Article>> {
        Ok(self.store.read().await.page(page))
    }

    async fn count(&mut self) -> Result<u64> {
        Ok(self.store.read().await.len() as u64)
    }
}
