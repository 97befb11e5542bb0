//! Alert evaluation against live request traffic.

use std::time::Duration;

use observability_core::alerts::{AlertEvent, AlertRule, AlertSeverity};
use observability_core::config::CoreConfig;
use sdk_rust::TelemetryClient;

mod common;

fn fast_alert_config() -> CoreConfig {
    let mut config = CoreConfig::default();
    config.alerts.evaluation_interval_secs = 1;
    config.alerts.cooldown_secs = 0;
    config.alerts.min_requests = 4;
    config.alerts.error_rate_threshold = 0.2;
    config
}

#[tokio::test]
async fn test_error_rate_alert_fires_from_traffic() {
    let server = common::start_server(fast_alert_config()).await;
    let mut events = server.telemetry.alerts.subscribe();
    let client = TelemetryClient::new(&server.url());

    for path in ["/ok", "/fail", "/fail", "/ok"] {
        client.get(path).await.unwrap();
    }

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("monitor evaluated in time")
        .unwrap();
    match event {
        AlertEvent::Fired(instance) => {
            assert_eq!(instance.rule_name, "high_error_rate");
            assert_eq!(instance.severity, AlertSeverity::Critical);
            assert!((instance.value - 0.5).abs() < 1e-9);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let alerts = client.alerts().await.unwrap();
    assert_eq!(alerts.active.len(), 1);
    assert_eq!(alerts.active[0].rule_name, "high_error_rate");
    assert_eq!(alerts.active[0].severity, "critical");
    assert!(!alerts.history.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_custom_rule_resolves() {
    let mut config = CoreConfig::default();
    config.alerts.default_rules = false;
    let server = common::start_server(config).await;
    let engine = &server.telemetry.alerts;

    engine.register_rule(
        AlertRule::new(
            "queue_backlog",
            AlertSeverity::Warning,
            100.0,
            |m| Ok(m.gauge("queue_depth", &[]) > 100.0),
            |m| Ok(m.gauge("queue_depth", &[])),
        )
        .with_cooldown(Duration::ZERO),
    );

    server.telemetry.metrics.set_gauge("queue_depth", 250.0, &[]);
    let summary = engine.evaluate();
    assert_eq!(summary.fired, vec!["queue_backlog"]);
    assert_eq!(engine.active_alert("queue_backlog").unwrap().value, 250.0);

    server.telemetry.metrics.set_gauge("queue_depth", 10.0, &[]);
    let summary = engine.evaluate();
    assert_eq!(summary.resolved, vec!["queue_backlog"]);
    assert!(engine.active_alerts().is_empty());

    let history = engine.alert_history();
    assert_eq!(history.len(), 1);
    assert!(history[0].resolved);
    assert!(history[0].resolved_at.is_some());

    server.stop().await;
}
