use std::sync::{Arc, Once};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{EngineConfig, Url2PngConfig};
use crate::engine::resolver::ThumbResolver;
use crate::provider::url2png::Url2PngProvider;
use crate::search::SearchClient;
use crate::server::handler::{AppState, EngineServer};

static INIT_TRACING: Once = Once::new();

/// Initialize tracing once, honoring RUST_LOG.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("showhn engine tracing initialized");
    });
}

/// Wire up the engine and HTTP server from configuration.
pub async fn start_server(
    engine: EngineConfig,
    provider: Url2PngConfig,
) -> Result<(Arc<ThumbResolver>, EngineServer)> {
    let provider = Arc::new(Url2PngProvider::new(provider, engine.fetch_timeout_secs)?);
    let resolver = Arc::new(ThumbResolver::new(&engine, provider)?);

    let state = AppState {
        resolver: Arc::clone(&resolver),
        search: Arc::new(SearchClient::new()),
    };
    let server = EngineServer::start(state).await?;
    info!("showhn engine listening on port {}", server.port());

    Ok((resolver, server))
}
