use async_trait::async_trait;

use crate::error::Result;
use super::client::LlmClient;
use super::types::{LlmRequest, LlmResponse};

/// 离线客户端，原样返回 prompt
///
/// 没有配置 LLM 端点时使用；依赖 JSON 回答的 step 会按各自的降级逻辑处理。
#[derive(Default, Clone)]
pub struct LocalEchoClient;

#[async_trait]
impl LlmClient for LocalEchoClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        Ok(LlmResponse {
            content: format!("[Echo] {}", request.user),
            metadata: request.metadata,
        })
    }
}
