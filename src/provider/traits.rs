use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Renders a page screenshot for a URL. Implementations must bound the
/// request with a timeout; the engine treats any error as a soft failure.
#[async_trait]
pub trait ScreenshotProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}
