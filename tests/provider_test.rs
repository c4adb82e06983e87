use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use showhn_engine::config::Url2PngConfig;
use showhn_engine::provider::traits::ScreenshotProvider;
use showhn_engine::provider::url2png::Url2PngProvider;

fn test_provider(endpoint: String) -> Url2PngProvider {
    Url2PngProvider::new(
        Url2PngConfig {
            api_key: "test-key".to_string(),
            secret: "test-secret".to_string(),
            endpoint,
            bounds: "300x300".to_string(),
        },
        5,
    )
    .unwrap()
}

async fn start_server(app: Router) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[test]
fn test_request_url_is_signed() {
    let provider = test_provider("http://api.url2png.com/v3".to_string());
    let token = format!("{:x}", md5::compute("test-secret+http://a.example"));

    assert_eq!(
        provider.request_url("http://a.example"),
        format!("http://api.url2png.com/v3/test-key/{token}/300x300/http://a.example")
    );
}

#[tokio::test]
async fn test_fetch_returns_image_bytes() {
    let app = Router::new().route(
        "/{key}/{token}/{bounds}/{*url}",
        get(|| async { vec![0xEF_u8; 256] }),
    );
    let addr = start_server(app).await;

    let provider = test_provider(format!("http://{addr}"));
    let bytes = provider.fetch("http://b.example/page").await.unwrap();

    assert_eq!(bytes.len(), 256);
    assert!(bytes.iter().all(|b| *b == 0xEF));
}

#[tokio::test]
async fn test_fetch_propagates_http_errors() {
    let app = Router::new().route(
        "/{key}/{token}/{bounds}/{*url}",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let addr = start_server(app).await;

    let provider = test_provider(format!("http://{addr}"));
    let err = provider.fetch("http://b.example/page").await.unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[tokio::test]
async fn test_fetch_fails_when_service_unreachable() {
    // Nothing listens on this port.
    let provider = test_provider("http://127.0.0.1:1".to_string());
    assert!(provider.fetch("http://b.example").await.is_err());
}
