use std::collections::BTreeMap;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub spans: usize,
    pub active_alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub le: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub buckets: Vec<Bucket>,
    pub sum: f64,
    pub count: u64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, f64>,
    pub gauges: BTreeMap<String, f64>,
    pub histograms: BTreeMap<String, HistogramSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertInstance {
    pub rule_name: String,
    pub severity: String,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: u64,
    pub resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsView {
    pub active: Vec<AlertInstance>,
    pub history: Vec<AlertInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default)]
    pub parent_span_id: Option<String>,
    pub name: String,
    pub timestamp: u64,
    pub duration: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub logs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceView {
    pub trace_id: String,
    pub spans: Vec<SpanRecord>,
}

pub struct TelemetryClient {
    client: Client,
    base_url: String,
}

impl TelemetryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn status(&self) -> Result<SystemStatus, Box<dyn std::error::Error>> {
        self.get_json("/health").await
    }

    /// Metrics in exposition text format.
    pub async fn metrics_text(&self) -> Result<String, Box<dyn std::error::Error>> {
        let resp = self.get("/metrics").await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Inspection API returned error status {}: {}", status, text).into());
        }
        Ok(text)
    }

    pub async fn metrics(&self) -> Result<MetricsSnapshot, Box<dyn std::error::Error>> {
        self.get_json("/metrics/json").await
    }

    pub async fn alerts(&self) -> Result<AlertsView, Box<dyn std::error::Error>> {
        self.get_json("/alerts").await
    }

    /// Spans of a trace, or `None` when the trace is unknown.
    pub async fn trace(&self, trace_id: &str) -> Result<Option<TraceView>, Box<dyn std::error::Error>> {
        self.get_optional(&format!("/traces/{}", trace_id)).await
    }

    /// A single span, or `None` when it is unknown or was evicted.
    pub async fn span(&self, span_id: &str) -> Result<Option<SpanRecord>, Box<dyn std::error::Error>> {
        self.get_optional(&format!("/spans/{}", span_id)).await
    }

    /// Plain GET against the service, for application routes.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, Box<dyn std::error::Error>> {
        let resp = self.get(path).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(resp).await.map(Some)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Box<dyn std::error::Error>> {
        let resp = self.get(path).await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Box<dyn std::error::Error>> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("Inspection API returned error status {}: {}", status, text).into());
    }
    Ok(serde_json::from_str::<T>(&text)?)
}
