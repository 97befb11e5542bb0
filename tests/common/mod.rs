//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use observability_core::config::CoreConfig;
use observability_core::lifecycle::{launch, Shutdown};
use observability_core::Telemetry;
use tokio::net::TcpListener;

/// A running service on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub telemetry: Telemetry,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[allow(dead_code)]
    pub async fn stop(self) -> usize {
        self.shutdown.trigger();
        self.shutdown.wait(Duration::from_secs(5)).await
    }
}

/// Application routes served next to the inspection API.
pub fn test_app() -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/fail", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                "slow"
            }),
        )
}

/// Start the full service with `config`, background tasks included.
pub async fn start_server(mut config: CoreConfig) -> TestServer {
    config.server.bind_address = "127.0.0.1:0".to_string();
    let listener = TcpListener::bind(&config.server.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let telemetry = launch(config, test_app(), listener, &shutdown);

    TestServer {
        addr,
        telemetry,
        shutdown,
    }
}
