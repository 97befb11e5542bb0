//! Startup orchestration.
//!
//! Builds the telemetry handles, starts the background tasks and the
//! inspection server, all tracked by the shutdown coordinator. The listener
//! is bound by the caller so tests can use an ephemeral port.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::alerts::AlertMonitor;
use crate::config::CoreConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::telemetry::Telemetry;
use crate::trace::SpanJanitor;

/// Start everything for `config`, serving `app` (instrumented) next to the
/// inspection routes on `listener`.
pub fn launch(
    config: CoreConfig,
    app: Router,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Telemetry {
    let telemetry = Telemetry::from_config(&config);

    let monitor = AlertMonitor::new(telemetry.alerts.clone(), &config.alerts);
    shutdown.spawn("alert-monitor", monitor.run(shutdown.subscribe()));

    let janitor = SpanJanitor::new(telemetry.traces.clone(), &config.tracing);
    shutdown.spawn("span-janitor", janitor.run(shutdown.subscribe()));

    let server = HttpServer::new(config, telemetry.clone()).with_app(app);
    let server_shutdown = shutdown.subscribe();
    shutdown.spawn("http-server", async move {
        if let Err(e) = server.run(listener, server_shutdown).await {
            tracing::error!(error = %e, "HTTP server failed");
        }
    });

    telemetry
}

/// Default drain deadline for [`Shutdown::wait`].
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
