//! OpenAI-compatible chat completions client.
//!
//! Works against any endpoint speaking the `/v1/chat/completions` dialect
//! (OpenAI, OpenRouter, Together, Ollama, self-hosted gateways). Timeouts
//! surface as `OracleTimeout` so the orchestrator can end the session
//! instead of retrying without bound.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::LlmClient;
use crate::error::{PipelineError, Result};

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageBody,
}

#[derive(Debug, Deserialize)]
struct ChatMessageBody {
    content: String,
}

impl OpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PipelineError::Oracle(e.to_string()))?;

        let endpoint = endpoint.into();
        let model = model.into();
        tracing::info!(%endpoint, %model, "creating chat completions oracle client");

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        // CDNs and proxies sometimes return HTML error pages with 200.
        let trimmed = text.trim_start();
        if trimmed.starts_with('<') {
            let preview: String = trimmed.chars().take(120).collect();
            return Err(PipelineError::Oracle(format!(
                "endpoint {} returned HTML instead of JSON (HTTP {status}): {preview}",
                self.endpoint
            )));
        }

        if !status.is_success() {
            let preview: String = text.chars().take(300).collect();
            return Err(PipelineError::Oracle(format!(
                "endpoint {} returned HTTP {status}: {preview}",
                self.endpoint
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(300).collect();
            PipelineError::Oracle(format!(
                "failed to parse completion from {}: {e}; body: {preview}",
                self.endpoint
            ))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::Oracle("completion had no choices".to_string()))?;

        tracing::debug!(chars = content.len(), "oracle completion received");
        Ok(content)
    }
}

fn map_transport_error(e: reqwest::Error) -> PipelineError {
    if e.is_timeout() {
        PipelineError::OracleTimeout
    } else {
        PipelineError::Oracle(e.to_string())
    }
}
