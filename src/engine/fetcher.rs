// Background screenshot fetch pool — bounded concurrency, fire-and-forget per batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::ThumbCache;
use super::stats::StatsCollector;
use crate::config::MIN_USABLE_IMAGE_BYTES;
use crate::provider::traits::ScreenshotProvider;

/// One unresolved cache slot: reserved by `token`, to be filled from `url`.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub id: String,
    pub url: String,
    pub token: String,
}

pub struct ScreenshotFetcher {
    provider: Arc<dyn ScreenshotProvider>,
    cache: Arc<ThumbCache>,
    semaphore: Arc<Semaphore>,
    stats: Arc<StatsCollector>,
    pending: Arc<AtomicUsize>,
    idle_notify: Arc<Notify>,
    shutdown_token: CancellationToken,
}

impl ScreenshotFetcher {
    pub fn new(
        provider: Arc<dyn ScreenshotProvider>,
        cache: Arc<ThumbCache>,
        max_concurrency: u32,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            provider,
            cache,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1) as usize)),
            stats,
            pending: Arc::new(AtomicUsize::new(0)),
            idle_notify: Arc::new(Notify::new()),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Stop launching new fetches. In-flight fetches run to completion; the
    /// token check neutralizes anything stale.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    /// Launch one background task per batch item. Items are independent and
    /// may complete in any order; per-item failures never surface to the
    /// resolve path.
    pub fn spawn_batch(&self, batch: Vec<PendingFetch>) {
        if self.shutdown_token.is_cancelled() {
            return;
        }

        for item in batch {
            self.pending.fetch_add(1, Ordering::SeqCst);

            let provider = Arc::clone(&self.provider);
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&self.semaphore);
            let stats = Arc::clone(&self.stats);
            let pending = Arc::clone(&self.pending);
            let idle_notify = Arc::clone(&self.idle_notify);
            let shutdown_token = self.shutdown_token.clone();

            tokio::spawn(async move {
                Self::fetch_one(item, provider, cache, semaphore, stats, shutdown_token).await;

                if pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                    idle_notify.notify_waiters();
                }
            });
        }
    }

    async fn fetch_one(
        item: PendingFetch,
        provider: Arc<dyn ScreenshotProvider>,
        cache: Arc<ThumbCache>,
        semaphore: Arc<Semaphore>,
        stats: Arc<StatsCollector>,
        shutdown_token: CancellationToken,
    ) {
        let _permit = tokio::select! {
            permit = semaphore.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
            _ = shutdown_token.cancelled() => {
                debug!("fetch for {} skipped: shutdown in progress", item.id);
                return;
            }
        };

        // A newer resolve may have re-reserved the slot while this item sat
        // waiting for a permit.
        if !cache.token_is_current(&item.id, &item.token) {
            stats.record_stale_drop();
            debug!("fetch for {} superseded before start", item.id);
            return;
        }

        let bytes = match provider.fetch(&item.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                stats.record_fetch_failure();
                warn!("screenshot fetch failed for {} ({}): {}", item.id, item.url, e);
                return;
            }
        };

        if (bytes.len() as u64) < MIN_USABLE_IMAGE_BYTES {
            // A body this short would read back as a token; treat it as a
            // failed fetch and leave the slot pending for the next resolve.
            stats.record_fetch_failure();
            warn!(
                "screenshot for {} too short ({} bytes), discarding",
                item.id,
                bytes.len()
            );
            return;
        }

        match cache.commit(&item.id, &item.token, &bytes) {
            Ok(true) => {
                stats.record_committed();
                debug!("screenshot for {} committed ({} bytes)", item.id, bytes.len());
            }
            Ok(false) => {
                stats.record_stale_drop();
            }
            Err(e) => {
                stats.record_fetch_failure();
                warn!("screenshot commit failed for {}: {}", item.id, e);
            }
        }
    }

    /// Wait until no batch item is queued or in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle_notify.notified();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
