use clap::Subcommand;
use nc_core::{ArticleStore, Page, Result, StoreHandle};

use crate::crawler::{Crawler, Trigger};

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum CrawlCommands {
    /// Crawl the configured target once and store the new articles
    Crawl,
    /// List stored articles
    List {
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = Page::DEFAULT_LIMIT)]
        limit: u32,
    },
}

pub async fn handle_command(command: CrawlCommands, crawler: &Crawler) -> Result<()> {
    match command {
        CrawlCommands::Crawl => {
            let outcome = crawler.run(Trigger::Cli).await?;
            if outcome.found == 0 {
                println!("No articles found at {}", crawler.target_url());
            } else {
                println!(
                    "🆕 {} new of {} articles found at {}",
                    outcome.inserted,
                    outcome.found,
                    crawler.target_url()
                );
            }
        }
        CrawlCommands::List { offset, limit } => {
            let mut handle = crawler.store().acquire_handle().await?;
            let total = handle.count().await?;
            let articles = handle.list(Page::new(offset, limit)).await?;
            println!("{} of {} stored articles:", articles.len(), total);
            for article in articles {
                println!(
                    "{:>5}  {}  [{}]  {} - {}",
                    article.id,
                    article.crawled_at.format("%Y-%m-%d %H:%M:%S"),
                    article.category,
                    article.title,
                    article.url
                );
            }
        }
    }
    Ok(())
}
