//! Trace propagation through a running server.

use observability_core::config::CoreConfig;
use observability_core::http::{X_PARENT_SPAN_ID, X_SPAN_ID, X_TRACE_ID};
use sdk_rust::TelemetryClient;

mod common;

#[tokio::test]
async fn test_inbound_trace_recorded_and_queryable() {
    let server = common::start_server(CoreConfig::default()).await;
    let http = reqwest::Client::new();

    let res = http
        .get(format!("{}/ok", server.url()))
        .header(X_TRACE_ID, "abc123")
        .header(X_PARENT_SPAN_ID, "upstream-span")
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    assert_eq!(res.headers()[X_TRACE_ID], "abc123");
    let span_id = res.headers()[X_SPAN_ID].to_str().unwrap().to_string();

    let client = TelemetryClient::new(&server.url());
    let trace = client.trace("abc123").await.unwrap().expect("trace recorded");
    assert_eq!(trace.trace_id, "abc123");
    assert_eq!(trace.spans.len(), 1);

    let span = client.span(&span_id).await.unwrap().expect("span recorded");
    assert_eq!(span.parent_span_id.as_deref(), Some("upstream-span"));
    assert_eq!(span.status.as_deref(), Some("ok"));
    assert!(span.duration.is_some());
    assert_eq!(span.tags["http.status_code"], 200);

    assert!(client.trace("unknown").await.unwrap().is_none());
    assert!(client.span("unknown").await.unwrap().is_none());

    drop(http);
    drop(client);
    assert_eq!(server.stop().await, 3);
}

#[tokio::test]
async fn test_request_metrics_exposed() {
    let server = common::start_server(CoreConfig::default()).await;
    let client = TelemetryClient::new(&server.url());

    for path in ["/ok", "/ok", "/fail", "/slow"] {
        client.get(path).await.unwrap();
    }

    let snapshot = client.metrics().await.unwrap();
    assert_eq!(snapshot.counters["http_requests_total"], 4.0);
    assert_eq!(snapshot.counters["http_errors_total"], 1.0);
    assert_eq!(
        snapshot.counters["http_requests_total{method=\"GET\",status=\"500\"}"],
        1.0
    );
    let latency = &snapshot.histograms["http_request_duration_ms"];
    assert_eq!(latency.count, 4);
    assert!(latency.sum >= 30.0);

    let text = client.metrics_text().await.unwrap();
    assert!(text.contains("# TYPE http_requests_total counter"));
    assert!(text.contains("# TYPE http_request_duration_ms histogram"));
    assert!(text.contains("http_request_duration_ms_bucket{le=\"+Inf\"} 4"));

    // Inspection routes are not counted.
    assert_eq!(server.telemetry.metrics.counter("http_requests_total", &[]), 4.0);

    let status = client.status().await.unwrap();
    assert_eq!(status.status, "operational");
    assert_eq!(status.spans, 4);

    server.stop().await;
}
