use nc_core::{ArticleStore, Error, Result};
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

/// Where the articles live, parsed from the configured database url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    #[cfg(feature = "sqlite")]
    SQLite(String),
}

impl BackendKind {
    pub fn from_url(url: &str) -> Result<Self> {
        if url == "memory" || url.starts_with("memory:") {
            return Ok(Self::Memory);
        }
        #[cfg(feature = "sqlite")]
        if url.starts_with("sqlite:") {
            return Ok(Self::SQLite(url.to_string()));
        }
        Err(Error::Config(format!("Unsupported database url: {}", url)))
    }
}

/// Opens the store behind `url`. SQLite databases are created and migrated on first use.
pub async fn create_storage(url: &str, max_connections: u32) -> Result<Arc<dyn ArticleStore>> {
    let storage: Arc<dyn ArticleStore> = match BackendKind::from_url(url)? {
        BackendKind::Memory => Arc::new(MemoryStorage::new()),
        #[cfg(feature = "sqlite")]
        BackendKind::SQLite(url) => Arc::new(SQLiteStorage::connect(&url, max_connections).await?),
    };
    info!("🏦 Storage backend initialized (using {})", storage.name());
    Ok(storage)
}
