//! Concurrent writers and readers against shared telemetry.

use std::time::{Duration, Instant};

use observability_core::config::CoreConfig;
use observability_core::trace::SpanStatus;
use observability_core::Telemetry;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_not_lost() {
    let telemetry = Telemetry::default();
    let tasks_count = 16;
    let per_task = 250;

    let mut tasks = Vec::new();
    for task in 0..tasks_count {
        let telemetry = telemetry.clone();
        tasks.push(tokio::spawn(async move {
            let worker = format!("w{}", task % 4);
            for i in 0..per_task {
                telemetry
                    .metrics
                    .increment_counter("jobs_total", 1.0, &[("worker", worker.as_str())]);
                telemetry
                    .metrics
                    .observe_histogram("job_ms", (i % 100) as f64, &[]);

                let span = telemetry.traces.start_span("job", None, None);
                telemetry.traces.add_tags(&span.span_id, [("i", i)]);
                telemetry.traces.end_span(&span.span_id, SpanStatus::Ok);
            }
        }));
    }

    let reader = {
        let telemetry = telemetry.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                telemetry.metrics.prometheus_text().unwrap();
                telemetry.alerts.evaluate();
                tokio::task::yield_now().await;
            }
        })
    };

    for t in tasks {
        t.await.unwrap();
    }
    reader.await.unwrap();

    let total = (tasks_count * per_task) as f64;
    assert_eq!(telemetry.metrics.counter("jobs_total", &[]), total);
    assert_eq!(
        telemetry.metrics.counter("jobs_total", &[("worker", "w0")]),
        total / 4.0
    );
    assert_eq!(
        telemetry.metrics.histogram("job_ms", &[]).unwrap().count(),
        (tasks_count * per_task) as u64
    );
    assert_eq!(telemetry.traces.len(), tasks_count * per_task);
}

#[tokio::test]
async fn test_load_through_server() {
    let server = common::start_server(CoreConfig::default()).await;

    let concurrency = 10;
    let requests_per_task = 20;
    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("{}/ok", server.url());
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                if let Ok(res) = client.get(&url).send().await {
                    if res.status().is_success() {
                        ok += 1;
                    }
                }
            }
            ok
        }));
    }

    let mut succeeded = 0;
    for t in tasks {
        succeeded += t.await.unwrap();
    }
    let elapsed = start.elapsed();
    println!("{} requests in {:?}", succeeded, elapsed);

    assert_eq!(succeeded, concurrency * requests_per_task);
    assert_eq!(
        server.telemetry.metrics.counter("http_requests_total", &[]),
        (concurrency * requests_per_task) as f64
    );
    assert!(elapsed < Duration::from_secs(30));

    server.stop().await;
}
