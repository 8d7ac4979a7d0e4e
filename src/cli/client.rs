use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

/// Thin HTTP client for the DataSense API.
///
/// Successful responses carry a `{success, data}` envelope; [`ApiClient`]
/// returns the `data` part and turns error bodies into `anyhow` errors that
/// keep the server's message and, for query failures, the failing step.
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("building HTTP client")?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        unwrap_envelope(response).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        let url = self.url(path);
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.with_context(|| format!("POST {}", url))?;
        unwrap_envelope(response).await
    }
}

async fn unwrap_envelope(response: Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("reading response body (HTTP {})", status))?;

    if status.is_success() && body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let message = body
        .get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    match body.get("step").and_then(Value::as_str) {
        Some(step) => Err(anyhow!("{} failed: {} (HTTP {})", step, message, status)),
        None => Err(anyhow!("{} (HTTP {})", message, status)),
    }
}
