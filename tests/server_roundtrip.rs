//! HTTP round-trips through the axum server and the echo delegate.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use request_bridge::adapter::{ApplicationDelegate, ContainerRequest, EchoDelegate, RequestAdapter};
use request_bridge::config::BridgeConfig;
use request_bridge::http::{HttpServer, X_REQUEST_ID};
use request_bridge::lifecycle::Shutdown;

async fn start_server(
    config: BridgeConfig,
    delegate: Arc<dyn ApplicationDelegate>,
) -> (SocketAddr, Shutdown) {
    let adapter = Arc::new(RequestAdapter::new(&config.adapter, delegate));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, adapter);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_json_post_is_echoed() {
    let mut config = BridgeConfig::default();
    config.adapter.base_path = "/api/".into();
    let (addr, shutdown) = start_server(config, Arc::new(EchoDelegate)).await;

    let res = client()
        .post(format!("http://{}/api/items?page=2", addr))
        .header("content-type", "application/json")
        .body(r#"{"name":"widget"}"#)
        .send()
        .await
        .expect("bridge unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key(X_REQUEST_ID));

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"], r#"{"name":"widget"}"#);
    assert_eq!(echo["base_uri"], format!("http://{}/api/", addr));
    assert_eq!(echo["request_uri"], format!("http://{}/api/items?page=2", addr));
    assert!(echo["request_id"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_get_has_no_body() {
    let (addr, shutdown) = start_server(BridgeConfig::default(), Arc::new(EchoDelegate)).await;

    let res = client().get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["method"], "GET");
    assert!(echo["body"].is_null());

    shutdown.trigger();
}

#[tokio::test]
async fn test_illegal_query_characters_are_encoded() {
    let (addr, shutdown) = start_server(BridgeConfig::default(), Arc::new(EchoDelegate)).await;

    let res = client()
        .get(format!("http://{}/test?a=b=c|d=e", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["request_uri"], format!("http://{}/test?a=b%3Dc%7Cd%3De", addr));
    assert_eq!(echo["base_uri"], format!("http://{}/", addr));

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = BridgeConfig::default();
    config.adapter.max_body_size = 16;
    let (addr, shutdown) = start_server(config, Arc::new(EchoDelegate)).await;

    let res = client()
        .put(format!("http://{}/upload", addr))
        .header("content-type", "application/json")
        .body(vec![b'1'; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 413);

    shutdown.trigger();
}

#[tokio::test]
async fn test_silent_delegate_yields_server_error() {
    let silent = |request: ContainerRequest| drop(request);
    let (addr, shutdown) = start_server(BridgeConfig::default(), Arc::new(silent)).await;

    let res = client().get(format!("http://{}/quiet", addr)).send().await.unwrap();
    assert_eq!(res.status(), 500);

    shutdown.trigger();
}
