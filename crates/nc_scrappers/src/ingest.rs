use chrono::Utc;
use nc_core::{CandidateArticle, Result, StoreHandle};
use tracing::{debug, info};

/// Stores the candidates whose url is not known yet and returns how many were written.
///
/// Lookups and inserts go through the one handle, and everything is committed
/// together at the end. A url that a concurrent crawl stored in the meantime is
/// rejected by the store's unique index and simply not counted.
pub async fn ingest(mut handle: Box<dyn StoreHandle>, candidates: Vec<CandidateArticle>) -> Result<usize> {
    let mut staged = 0;
    for candidate in candidates {
        if handle.contains_url(&candidate.url).await? {
            debug!("⏭️ Already stored: {}", candidate.url);
            continue;
        }
        debug!("🆕 {} - {}", candidate.title, candidate.url);
        handle.stage(candidate.into_new_article(Utc::now())).await?;
        staged += 1;
    }

    if staged == 0 {
        return Ok(0);
    }

    let written = handle.commit().await?;
    if written < staged {
        info!("{} articles were stored by a concurrent crawl first", staged - written);
    }
    Ok(written)
}
