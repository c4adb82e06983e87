// Hacker News search client — paginated queries, dedup, fallback URL extraction.

use std::collections::HashSet;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{SEARCH_PAGE_SIZE, SEARCH_WINDOW_LIMIT};
use crate::engine::resolver::FetchRequest;

pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "http://api.thriftdb.com/api.hnsearch.com/items/_search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn modifier(self) -> &'static str {
        match self {
            SortOrder::Ascending => "create_ts asc",
            SortOrder::Descending => "create_ts desc",
        }
    }
}

/// One submission document as returned by the search API.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub guid: String,
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub create_ts: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub item: Post,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

pub struct SearchClient {
    client: Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_SEARCH_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// One page of submissions. `limit` is clamped to the API page-size cap.
    pub async fn search(
        &self,
        query: &str,
        start: usize,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let limit = limit.min(SEARCH_PAGE_SIZE);
        let start_param = start.to_string();
        let limit_param = limit.to_string();

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("start", start_param.as_str()),
                ("limit", limit_param.as_str()),
                ("sortby", order.modifier()),
                ("filter[fields][type]", "submission"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("search failed: HTTP {}", status.as_u16()));
        }

        let body: SearchResponse = resp.json().await?;
        debug!(
            "search {:?} start={} returned {} hits",
            query,
            start,
            body.results.len()
        );
        Ok(body.results)
    }

    /// Page through the full search window in one direction.
    pub async fn search_all(&self, query: &str, order: SortOrder) -> Result<Vec<SearchHit>> {
        let mut results = Vec::new();
        let mut start = 0;
        while start + SEARCH_PAGE_SIZE <= SEARCH_WINDOW_LIMIT {
            results.extend(self.search(query, start, order, SEARCH_PAGE_SIZE).await?);
            start += SEARCH_PAGE_SIZE;
        }
        Ok(results)
    }

    /// Both directions through the window; queries with fewer than two
    /// windows' worth of matches are fetched in full.
    pub async fn double_search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let mut results = self.search_all(query, SortOrder::Ascending).await?;
        results.extend(self.search_all(query, SortOrder::Descending).await?);
        Ok(results)
    }

    /// All "Show HN" submissions under both spellings, deduplicated.
    pub async fn show_hn_posts(&self) -> Result<Vec<SearchHit>> {
        let mut hits = self.double_search("\"show hn\"").await?;
        hits.extend(self.search_all("showhn", SortOrder::Ascending).await?);
        Ok(remove_duplicates(hits))
    }
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-preserving dedup by item guid.
pub fn remove_duplicates(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.item.guid.clone()))
        .collect()
}

/// Shortest http(s) URL found in the post text, for submissions that carry
/// their link in the body instead of the url field.
pub fn extract_url(text: &str) -> Option<String> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = URL_RE.get_or_init(|| Regex::new(r"https?://[^\s<(|)]+").expect("url regex"));

    re.find_iter(text)
        .map(|m| m.as_str())
        .min_by_key(|url| url.len())
        .map(str::to_string)
}

/// Build the engine's fetch batch from search hits: prefer the submission's
/// own URL, fall back to one scraped from the text.
pub fn to_fetch_requests(hits: &[SearchHit]) -> Vec<FetchRequest> {
    hits.iter()
        .map(|hit| FetchRequest {
            id: hit.item.id.to_string(),
            url: hit
                .item
                .url
                .clone()
                .filter(|url| !url.is_empty())
                .or_else(|| hit.item.text.as_deref().and_then(extract_url)),
        })
        .collect()
}
