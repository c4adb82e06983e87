// Axum request handlers — translate HTTP requests into resolve/search calls.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::engine::resolver::{FetchRequest, ThumbResolver};
use crate::search::{to_fetch_requests, SearchClient, SortOrder};

/// Shared state: the resolve engine plus the search client.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ThumbResolver>,
    pub search: Arc<SearchClient>,
}

pub struct EngineServer {
    port: u16,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl EngineServer {
    /// Start the server on a random local port, returning a handle.
    pub async fn start(state: AppState) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = Router::new()
            .route("/resolve", post(resolve_handler))
            .route("/posts", get(posts_handler))
            .route("/stats", get(stats_handler))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Build a URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Shutdown the server gracefully.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// POST /resolve — map a batch of posts to displayable thumbnail paths.
async fn resolve_handler(
    State(state): State<AppState>,
    Json(requests): Json<Vec<FetchRequest>>,
) -> Json<HashMap<String, String>> {
    let mapping = state.resolver.resolve(&requests);
    debug!("resolved {} requests", requests.len());

    Json(
        mapping
            .into_iter()
            .map(|(id, path)| (id, path.to_string_lossy().into_owned()))
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct PostsParams {
    count: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PostEntry {
    id: String,
    title: Option<String>,
    url: Option<String>,
    thumb: String,
}

/// GET /posts?count=N — newest Show HN submissions with thumbnail paths.
async fn posts_handler(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> Response {
    let count = params.count.unwrap_or(16);

    let hits = match state
        .search
        .search("\"show hn\"", 0, SortOrder::Descending, count)
        .await
    {
        Ok(hits) => hits,
        Err(e) => {
            error!("show hn search failed: {}", e);
            return (StatusCode::BAD_GATEWAY, format!("search failed: {}", e)).into_response();
        }
    };

    let requests = to_fetch_requests(&hits);
    let mapping = state.resolver.resolve(&requests);

    let entries: Vec<PostEntry> = hits
        .iter()
        .zip(requests.iter())
        .map(|(hit, request)| PostEntry {
            id: request.id.clone(),
            title: hit.item.title.clone(),
            url: request.url.clone(),
            thumb: mapping
                .get(&request.id)
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
        .collect();

    Json(entries).into_response()
}

/// GET /stats — engine counters.
async fn stats_handler(State(state): State<AppState>) -> Response {
    Json(state.resolver.snapshot()).into_response()
}
