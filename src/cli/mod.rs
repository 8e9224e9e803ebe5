use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::chat::{ChatReply, ChatSink};
use crate::config::{build_llm_client, build_registry, AppConfig, EnvConfig};
use crate::error::Result;
use crate::pipeline::PipelineRegistry;
use crate::runtime::{PipelineRunner, ProgressSink};

#[derive(Clone, Debug, Serialize)]
pub struct PipelineSummary {
    pub name: String,
    pub steps: Vec<String>,
}

/// 读取配置文件；未指定时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_path(path),
        None => Ok(AppConfig::default()),
    }
}

/// 按配置和环境变量组装运行器
pub fn build_runner(config: &AppConfig) -> Result<PipelineRunner> {
    let llm = build_llm_client(config)?;
    let registry = build_registry(config, llm)?;
    Ok(PipelineRunner::new(Arc::new(registry)).with_conditions(EnvConfig::run_conditions()))
}

pub fn pipeline_summaries(registry: &PipelineRegistry) -> Vec<PipelineSummary> {
    registry
        .pipeline_names()
        .into_iter()
        .filter_map(|name| {
            let steps = registry.resolve(name).ok()?;
            Some(PipelineSummary {
                name: name.to_string(),
                steps: steps.to_vec(),
            })
        })
        .collect()
}

/// 进度文案输出到 stderr
pub struct ConsoleProgress;

#[async_trait]
impl ProgressSink for ConsoleProgress {
    async fn notify(&self, step: &str, label: &str) {
        eprintln!("[{}] {}", step, label);
    }
}

/// 控制台聊天回复
pub struct ConsoleSink {
    stdout: Mutex<Stdout>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatSink for ConsoleSink {
    async fn send(&self, _recipient: &str, reply: ChatReply) -> Result<()> {
        let mut out = self.stdout.lock().await;
        out.write_all(format!("adboard> {}\n", reply.text).as_bytes())
            .await?;
        for attachment in &reply.attachments {
            out.write_all(
                format!(
                    "  [attachment {} ({} bytes)]\n",
                    attachment.mime_type,
                    attachment.uri.len()
                )
                .as_bytes(),
            )
            .await?;
        }
        if reply.end_session {
            out.write_all(b"  (session ended)\n").await?;
        }
        out.flush().await?;
        Ok(())
    }
}
