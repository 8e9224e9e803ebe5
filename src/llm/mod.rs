// LLM 模块 - 文本补全客户端

mod client;
mod echo;
mod json;
#[cfg(feature = "http-client")]
mod openai;
mod types;

pub use client::{DynLlmClient, LlmClient};
pub use echo::LocalEchoClient;
pub use json::extract_json;
#[cfg(feature = "http-client")]
pub use openai::OpenAiCompatClient;
pub use types::{LlmRequest, LlmResponse};
