// Resolve path — classifies a batch as hit/miss/null without touching the
// network, then hands the misses to the background fetch pool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

use super::cache::ThumbCache;
use super::fetcher::{PendingFetch, ScreenshotFetcher};
use super::stats::{StatsCollector, StatsSnapshot};
use crate::config::EngineConfig;
use crate::provider::traits::ScreenshotProvider;

/// One post to resolve: an opaque id plus an optional link URL.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    pub id: String,
    pub url: Option<String>,
}

pub struct ThumbResolver {
    cache: Arc<ThumbCache>,
    fetcher: Arc<ScreenshotFetcher>,
    stats: Arc<StatsCollector>,
    dummy_path: PathBuf,
    none_path: PathBuf,
}

impl ThumbResolver {
    /// Open the cache directory and start the background fetch pool.
    pub fn new(config: &EngineConfig, provider: Arc<dyn ScreenshotProvider>) -> Result<Self> {
        let cache = Arc::new(ThumbCache::new(&config.cache_dir)?);
        let stats = Arc::new(StatsCollector::new());
        let fetcher = Arc::new(ScreenshotFetcher::new(
            provider,
            Arc::clone(&cache),
            config.max_concurrency,
            Arc::clone(&stats),
        ));

        Ok(Self {
            cache,
            fetcher,
            stats,
            dummy_path: config.dummy_path.clone(),
            none_path: config.none_path.clone(),
        })
    }

    /// Map every request to a displayable path right now. Misses get the
    /// "dummy" placeholder, have their slot reserved with a fresh token, and
    /// are queued as one background batch; requests without a URL get the
    /// "none" placeholder and are never queued. This path performs no network
    /// I/O, only small local file reads and writes.
    pub fn resolve(&self, requests: &[FetchRequest]) -> HashMap<String, PathBuf> {
        let mut mapping = HashMap::with_capacity(requests.len());
        let mut misses = Vec::new();

        for request in requests {
            let url = match &request.url {
                Some(url) if !url.is_empty() => url,
                _ => {
                    self.stats.record_null();
                    mapping.insert(request.id.clone(), self.none_path.clone());
                    continue;
                }
            };

            if let Some(path) = self.cache.usable_png(&request.id) {
                self.stats.record_hit();
                mapping.insert(request.id.clone(), path);
                continue;
            }

            if let Some(path) = self.cache.legacy_jpg(&request.id) {
                self.stats.record_legacy_hit();
                mapping.insert(request.id.clone(), path);
                continue;
            }

            self.stats.record_miss();
            mapping.insert(request.id.clone(), self.dummy_path.clone());

            let token = self.cache.mint_token();
            if let Err(e) = self.cache.write_token(&request.id, &token) {
                // Slot could not be reserved; a later resolve will retry.
                warn!("token write failed for {}: {}", request.id, e);
                continue;
            }
            misses.push(PendingFetch {
                id: request.id.clone(),
                url: url.clone(),
                token,
            });
        }

        if !misses.is_empty() {
            debug!("resolve queued {} screenshot fetches", misses.len());
            self.fetcher.spawn_batch(misses);
        }

        mapping
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Wait for all queued background fetches to finish.
    pub async fn wait_idle(&self) {
        self.fetcher.wait_idle().await;
    }

    /// Stop launching new background fetches.
    pub fn shutdown(&self) {
        self.fetcher.shutdown();
    }
}

impl Drop for ThumbResolver {
    fn drop(&mut self) {
        self.fetcher.shutdown();
    }
}
