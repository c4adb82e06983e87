use std::path::PathBuf;

use serde::Deserialize;

/// Minimum length for a cached file to count as a real screenshot.
/// Anything shorter is a freshness token or a truncated write and is
/// treated as a cache miss.
pub const MIN_USABLE_IMAGE_BYTES: u64 = 100;

/// Hard cap the search API places on a single page of results.
pub const SEARCH_PAGE_SIZE: usize = 100;

/// The search API rejects queries whose start + limit exceed this window.
pub const SEARCH_WINDOW_LIMIT: usize = 1000;

/// Bounding box requested from the screenshot-rendering service.
pub const THUMB_BOUNDS: &str = "300x300";

/// Base endpoint of the url2png rendering service, without a trailing slash.
pub const URL2PNG_ENDPOINT: &str = "http://api.url2png.com/v3";

/// Top-level configuration for the thumbnail engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Directory holding cached `{id}.png` and legacy `{id}.jpg` files.
    pub cache_dir: PathBuf,
    /// Placeholder served while a screenshot is still being fetched.
    pub dummy_path: PathBuf,
    /// Placeholder served for posts with no fetchable URL.
    pub none_path: PathBuf,
    /// Maximum number of concurrent background screenshot fetches.
    pub max_concurrency: u32,
    /// Timeout for a single screenshot fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("images"),
            dummy_path: PathBuf::from("static/dummy.png"),
            none_path: PathBuf::from("static/none.png"),
            max_concurrency: 4,
            fetch_timeout_secs: 20,
        }
    }
}

/// Credentials and endpoint for the url2png screenshot service.
#[derive(Debug, Clone, Deserialize)]
pub struct Url2PngConfig {
    pub api_key: String,
    pub secret: String,
    /// Base endpoint, without a trailing slash.
    pub endpoint: String,
    /// Bounding box for rendered thumbnails, e.g. "300x300".
    pub bounds: String,
}

impl Default for Url2PngConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret: String::new(),
            endpoint: URL2PNG_ENDPOINT.to_string(),
            bounds: THUMB_BOUNDS.to_string(),
        }
    }
}
