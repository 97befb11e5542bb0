//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Merge the inspection routes with the embedding application's routes
//! - Wrap application routes with trace propagation
//! - Wire up middleware (request timeout, access tracing)
//! - Bind to the listener and stop on the shutdown broadcast

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::CoreConfig;
use crate::http::propagation::instrument;
use crate::telemetry::Telemetry;

/// HTTP server for the inspection endpoints and an optional application.
pub struct HttpServer {
    config: CoreConfig,
    telemetry: Telemetry,
    app: Router,
}

impl HttpServer {
    pub fn new(config: CoreConfig, telemetry: Telemetry) -> Self {
        Self {
            config,
            telemetry,
            app: Router::new(),
        }
    }

    /// Serve `app` next to the inspection routes. Every route of `app` is
    /// traced and counted in the request metrics.
    pub fn with_app(mut self, app: Router) -> Self {
        self.app = app;
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let app = instrument(self.app.clone(), self.telemetry.clone());

        setup_admin_router(self.telemetry.clone())
            .merge(app)
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_router_serves_admin_and_app() {
        let telemetry = Telemetry::default();
        let app = Router::new().route("/hello", get(|| async { "hi" }));
        let router = HttpServer::new(CoreConfig::default(), telemetry.clone())
            .with_app(app)
            .router();

        let response = router
            .clone()
            .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-trace-id"));

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("x-trace-id"));

        assert_eq!(telemetry.traces.len(), 1);
    }
}
