use axum::{
    extract::{Query, State},
    Json,
};
use nc_core::{Article, ArticleStore, Page, StoreHandle};
use nc_scrappers::Trigger;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl From<Pagination> for Page {
    fn from(p: Pagination) -> Self {
        Page::new(p.offset.unwrap_or(0), p.limit.unwrap_or(Page::DEFAULT_LIMIT))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub message: String,
    pub inserted: usize,
    pub total_articles_found: usize,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "News crawler API",
        "docs": "/api/v1/articles",
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "scheduler_running": state.scheduler.is_running(),
    }))
}

/// GET /api/v1/articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let mut handle = state.crawler.store().acquire_handle().await?;
    let articles = handle.list(pagination.into()).await?;
    Ok(Json(articles))
}

/// POST /crawl/now
pub async fn crawl_now(State(state): State<Arc<AppState>>) -> Result<Json<CrawlResponse>, ApiError> {
    info!("Manual crawling: {}", state.crawler.target_url());
    let outcome = state.crawler.run(Trigger::Manual).await?;
    if outcome.found == 0 {
        return Err(ApiError::NothingFound);
    }

    Ok(Json(CrawlResponse {
        message: "Crawl finished and new articles stored".to_string(),
        inserted: outcome.inserted,
        total_articles_found: outcome.found,
    }))
}
