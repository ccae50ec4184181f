use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nc_core::{Article, ArticleStore, Error, NewArticle, Page, Result, StoreHandle};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'Tech',
        crawled_at TEXT NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_url ON articles (url)",
    "CREATE INDEX IF NOT EXISTS idx_articles_title ON articles (title)",
    // Add future migrations here
];

fn db_error(context: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

#[derive(Clone)]
pub struct SQLiteStorage {
    pool: SqlitePool,
}

impl SQLiteStorage {
    /// Connects to `url` (`sqlite:articles.db`, `sqlite::memory:`), creating the file
    /// if needed, and runs the migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("Invalid database url {}: {}", url, e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            // Every connection to :memory: is a separate database; keep the one alive.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("Failed to run migration {}", i), e))?;
        }
        debug!("SQLite schema ready at {}", url);

        Ok(Self { pool })
    }

    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(&format!("sqlite:{}", db_path.display()), 1).await
    }
}

#[async_trait]
impl ArticleStore for SQLiteStorage {
    async fn acquire_handle(&self) -> Result<Box<dyn StoreHandle>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_error("Failed to acquire connection", e))?;

        // Writers hold the lock from the start, so a racing handle waits on the
        // busy timeout and then reads the committed rows.
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;

        Ok(Box::new(SQLiteHandle {
            conn: Some(conn),
            written: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

/// A pooled connection inside an open write transaction. Dropping it without
/// `commit` rolls back before the connection goes back to the pool.
pub struct SQLiteHandle {
    conn: Option<PoolConnection<Sqlite>>,
    written: usize,
}

impl SQLiteHandle {
    fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| Error::Storage("Handle already finished".to_string()))
    }
}

impl Drop for SQLiteHandle {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                        warn!("Failed to roll back dropped handle: {}", e);
                    }
                });
            }
            // Without a runtime the connection is closed, which rolls back too.
            Err(_) => drop(conn.detach()),
        }
    }
}

fn row_to_article(row: SqliteRow) -> Result<Article> {
    let crawled_at: String = row.get("crawled_at");
    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        url: row.get("url"),
        category: row.get("category"),
        crawled_at: DateTime::parse_from_rfc3339(&crawled_at)
            .map_err(|e| Error::Storage(format!("Failed to parse date: {}", e)))?
            .with_timezone(&Utc),
    })
}

#[async_trait]
impl StoreHandle for SQLiteHandle {
    async fn contains_url(&mut self, url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE url = ? LIMIT 1")
            .bind(url)
            .fetch_optional(self.conn()?)
            .await
            .map_err(|e| db_error("Failed to look up article", e))?;
        Ok(row.is_some())
    }

    async fn stage(&mut self, article: NewArticle) -> Result<()> {
        // The unique index decides; a url inserted by a racing crawl writes nothing.
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, url, category, crawled_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.category)
        .bind(article.crawled_at.to_rfc3339())
        .execute(self.conn()?)
        .await
        .map_err(|e| db_error("Failed to store article", e))?;

        if result.rows_affected() == 0 {
            debug!("Skipped duplicate url {}", article.url);
        }
        self.written += result.rows_affected() as usize;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<usize> {
        let mut this = self;
        let written = this.written;
        // On failure the handle still owns the connection, so dropping it rolls back.
        sqlx::query("COMMIT")
            .execute(this.conn()?)
            .await
            .map_err(|e| db_error("Failed to commit articles", e))?;
        drop(this.conn.take());
        Ok(written)
    }

    async fn list(&mut self, page: Page) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, url, category, crawled_at FROM articles
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(self.conn()?)
        .await
        .map_err(|e| db_error("Failed to list articles", e))?;

        rows.into_iter().map(row_to_article).collect()
    }

    async fn count(&mut self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.conn()?)
            .await
            .map_err(|e| db_error("Failed to count articles", e))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nc_core::CandidateArticle;
    use tempfile::tempdir;

    fn new_article(n: u32) -> NewArticle {
        CandidateArticle::new(format!("Article {n}"), format!("https://example.com/post/{n}"))
            .into_new_article(Utc::now())
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        let mut handle = storage.acquire_handle().await.unwrap();
        assert!(!handle.contains_url("https://example.com/post/1").await.unwrap());
        handle.stage(new_article(1)).await.unwrap();
        handle.stage(new_article(2)).await.unwrap();
        assert!(handle.contains_url("https://example.com/post/1").await.unwrap());
        assert_eq!(handle.commit().await.unwrap(), 2);

        let mut handle = storage.acquire_handle().await.unwrap();
        let articles = handle.list(Page::default()).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, 1);
        assert_eq!(articles[0].title, "Article 1");
        assert_eq!(articles[0].category, "Tech");
        assert_eq!(articles[1].url, "https://example.com/post/2");
        assert_eq!(handle.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rollback_on_drop() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        {
            let mut handle = storage.acquire_handle().await.unwrap();
            handle.stage(new_article(1)).await.unwrap();
        }

        let mut handle = storage.acquire_handle().await.unwrap();
        assert_eq!(handle.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate_url() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let mut handle = storage.acquire_handle().await.unwrap();
        handle.stage(new_article(1)).await.unwrap();
        assert_eq!(handle.commit().await.unwrap(), 1);

        // Skip the lookup, as a racing crawl would have.
        let mut handle = storage.acquire_handle().await.unwrap();
        handle.stage(new_article(1)).await.unwrap();
        handle.stage(new_article(2)).await.unwrap();
        assert_eq!(handle.commit().await.unwrap(), 1);

        let mut handle = storage.acquire_handle().await.unwrap();
        assert_eq!(handle.count().await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_second_writer_waits_for_the_first() {
        let temp_dir = tempdir().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
        let storage = SQLiteStorage::connect(&url, 4).await.unwrap();

        let mut first = storage.acquire_handle().await.unwrap();
        assert!(!first.contains_url("https://example.com/post/1").await.unwrap());
        first.stage(new_article(1)).await.unwrap();

        let racing = storage.clone();
        let second = tokio::spawn(async move {
            let mut handle = racing.acquire_handle().await?;
            let seen = handle.contains_url("https://example.com/post/1").await?;
            if !seen {
                handle.stage(new_article(1)).await?;
            }
            let written = handle.commit().await?;
            Ok::<_, Error>((seen, written))
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!second.is_finished());
        assert_eq!(first.commit().await.unwrap(), 1);

        let (seen, written) = second.await.unwrap().unwrap();
        assert!(seen);
        assert_eq!(written, 0);

        let mut handle = storage.acquire_handle().await.unwrap();
        assert_eq!(handle.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let storage = SQLiteStorage::connect("sqlite::memory:", 4).await.unwrap();
        let mut handle = storage.acquire_handle().await.unwrap();
        for n in 1..=15 {
            handle.stage(new_article(n)).await.unwrap();
        }
        handle.commit().await.unwrap();

        let mut handle = storage.acquire_handle().await.unwrap();
        assert_eq!(handle.list(Page::default()).await.unwrap().len(), 10);
        let tail = handle.list(Page::new(10, 10)).await.unwrap();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].title, "Article 11");
    }
}
