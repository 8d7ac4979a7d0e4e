use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::error::GenerationError;
use super::prompt::{insights_prompt, GenerationRequest};
use crate::config::GenerationConfig;

/// External service that turns natural language into queries.
/// Its output is untrusted and parsed by [`super::GeneratedQuery`].
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Raw generator text for one request
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Short bullet-point insights over read results
    async fn summarize(&self, prompt: &str, results: &[Value]) -> Result<String, GenerationError>;
}

/// Client for an Ollama-compatible `/api/chat` endpoint
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
    analyst_model: String,
}

impl LlmClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            analyst_model: config.analyst_model.clone(),
        })
    }

    async fn chat(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        info!("Calling model {}", model);
        let payload = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false
        });

        let url = format!("{}/api/chat", self.base_url);
        let response = self.client.post(&url).json(&payload).send().await.map_err(|e| {
            warn!("Generator request failed: {}", e);
            GenerationError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let data: Value = response.json().await?;
        let content = data["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::MalformedResponse("missing message.content".to_string()))?;
        debug!("Model {} responded with {} chars", model, content.len());
        Ok(content.to_string())
    }
}

#[async_trait]
impl QueryGenerator for LlmClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.chat(&self.model, &request.render()).await
    }

    async fn summarize(&self, prompt: &str, results: &[Value]) -> Result<String, GenerationError> {
        self.chat(&self.analyst_model, &insights_prompt(prompt, results)).await
    }
}
