use nc_core::{Error, Result};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::crawler::{Crawler, Trigger};

struct TimerTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// How long `stop` waits for crawls that are already running.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the crawler on a fixed interval until stopped.
///
/// Each tick spawns its own crawl, so a slow crawl never delays the next tick.
/// Stopping cancels future ticks and gives crawls already running up to the
/// drain timeout to finish; whatever is left after that is aborted and rolls back.
pub struct CrawlScheduler {
    crawler: Crawler,
    drain_timeout: Duration,
    timer: Mutex<Option<TimerTask>>,
}

impl CrawlScheduler {
    pub fn new(crawler: Crawler) -> Self {
        Self {
            crawler,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            timer: Mutex::new(None),
        }
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Starts ticking every `period`, the first tick one period from now.
    /// Fails if the scheduler is already running.
    pub fn start(&self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(Error::Config("Crawl interval must be greater than zero".to_string()));
        }

        let mut timer = self
            .timer
            .lock()
            .map_err(|_| Error::Scheduler("Scheduler state is poisoned".to_string()))?;
        if timer.is_some() {
            return Err(Error::Scheduler("Scheduler is already running".to_string()));
        }

        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run_timer(self.crawler.clone(), period, self.drain_timeout, rx));
        *timer = Some(TimerTask { shutdown, handle });

        info!("⏰ Scheduler started, crawling every {}s", period.as_secs());
        Ok(())
    }

    /// Stops the timer and waits for it to drain. Does nothing when stopped.
    pub async fn stop(&self) {
        let task = match self.timer.lock() {
            Ok(mut timer) => timer.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            if let Err(e) = task.handle.await {
                error!("Scheduler timer ended abnormally: {}", e);
            }
            info!("Scheduler shut down");
        }
    }

    pub fn is_running(&self) -> bool {
        match self.timer.lock() {
            Ok(timer) => timer.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

async fn run_timer(
    crawler: Crawler,
    period: Duration,
    drain_timeout: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut crawls = JoinSet::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let crawler = crawler.clone();
                // Failures are logged by the crawler; the timer keeps going.
                crawls.spawn(async move {
                    let _ = crawler.run(Trigger::Scheduled).await;
                });
            }
            Some(_) = crawls.join_next(), if !crawls.is_empty() => {}
            changed = shutdown.changed() => {
                // A dropped sender means the scheduler itself is gone.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    drain(crawls, drain_timeout).await;
}

async fn drain(mut crawls: JoinSet<()>, drain_timeout: Duration) {
    if crawls.is_empty() {
        return;
    }

    info!("Waiting for {} scheduled crawls to finish", crawls.len());
    let finished = tokio::time::timeout(drain_timeout, async {
        while crawls.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        warn!(
            "Aborting {} scheduled crawls still running after {}s",
            crawls.len(),
            drain_timeout.as_secs()
        );
        crawls.shutdown().await;
    }
}
