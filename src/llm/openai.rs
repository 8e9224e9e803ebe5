use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use crate::error::{AdboardError, Result};
use super::client::LlmClient;
use super::types::{LlmRequest, LlmResponse};

/// OpenAI 兼容的 chat/completions 客户端
#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiCompatClient {
    /// `endpoint` 是 API 根地址，例如 `https://api.openai.com/v1`
    pub fn new<S1, S2, S3>(endpoint: S1, api_key: S2, model: S3) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AdboardError::Llm(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
        })
    }

    /// 固定采样温度，忽略各 step 自己的设置
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.endpoint);
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }
        messages.push(json!({
            "role": "user",
            "content": request.user
        }));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature.unwrap_or(request.temperature),
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdboardError::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AdboardError::Llm(format!(
                "request failed with status {}: {}",
                status, detail
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AdboardError::Llm(e.to_string()))?;
        let content = payload["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| AdboardError::Llm("missing message content".into()))?;

        Ok(LlmResponse {
            content: content.to_string(),
            metadata: payload.get("usage").cloned(),
        })
    }
}
