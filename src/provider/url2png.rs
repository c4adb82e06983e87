// url2png v3 backend — signed GET requests to the rendering service.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use super::traits::ScreenshotProvider;
use crate::config::Url2PngConfig;

pub struct Url2PngProvider {
    client: Client,
    config: Url2PngConfig,
}

impl Url2PngProvider {
    pub fn new(config: Url2PngConfig, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Signed request URL:
    /// `{endpoint}/{api_key}/{md5(secret + "+" + url)}/{bounds}/{url}`.
    pub fn request_url(&self, url: &str) -> String {
        let token = format!(
            "{:x}",
            md5::compute(format!("{}+{}", self.config.secret, url))
        );
        format!(
            "{}/{}/{}/{}/{}",
            self.config.endpoint, self.config.api_key, token, self.config.bounds, url
        )
    }
}

#[async_trait]
impl ScreenshotProvider for Url2PngProvider {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let request_url = self.request_url(url);
        debug!("requesting screenshot for {}", url);

        let resp = self.client.get(&request_url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(
                "screenshot service returned HTTP {} for {}",
                status.as_u16(),
                url
            );
            return Err(anyhow!("screenshot fetch failed: HTTP {}", status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        Ok(bytes)
    }
}
