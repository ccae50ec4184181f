pub mod error;
pub mod storage;
pub mod types;

pub use error::Error;
pub use storage::{ArticleStore, StoreHandle};
pub use types::{Article, CandidateArticle, CrawlOutcome, NewArticle, Page, DEFAULT_CATEGORY};

pub type Result<T> = std::result::Result<T, Error>;
