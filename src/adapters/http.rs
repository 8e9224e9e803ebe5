//! 通用 HTTP step - 把请求和已有结果 POST 给外部服务

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use crate::campaign::CampaignRequest;
use crate::error::{AdboardError, Result};
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

/// 调用外部服务的 step
///
/// 请求体：`{"step": ..., "request": ..., "results": ...}`，响应体必须是 JSON 对象。
/// 更短的超时和重试通过 `StepPolicy` 配置。
pub struct HttpStep {
    name: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpStep {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AdboardError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// 408、429 和 5xx 可以稍后再试，其余 4xx 说明配置有误
fn outcome_for_status(step: &str, status: StatusCode, body: &str) -> StepOutcome {
    let message = format!("step `{}` endpoint returned {}: {}", step, status, body.trim());
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        StepOutcome::transient(message)
    } else {
        StepOutcome::configuration(message)
    }
}

#[async_trait]
impl StepAdapter for HttpStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        let body = json!({
            "step": self.name,
            "request": request,
            "results": results,
        });

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }
        debug!(step = %self.name, endpoint = %self.endpoint, "calling step endpoint");

        let response = match call.send().await {
            Ok(response) => response,
            Err(err) => {
                return StepOutcome::transient(format!("step `{}` request failed: {}", self.name, err))
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return outcome_for_status(&self.name, status, &text);
        }

        match response.json::<Value>().await {
            Ok(payload) if payload.is_object() => StepOutcome::success(payload),
            Ok(_) => StepOutcome::transient(format!(
                "step `{}` endpoint returned a non-object body",
                self.name
            )),
            Err(err) => StepOutcome::transient(format!(
                "step `{}` endpoint returned invalid json: {}",
                self.name, err
            )),
        }
    }
}
