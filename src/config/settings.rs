use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::campaign::{CampaignRequestBuilder, Tone};
use crate::error::{AdboardError, Result};
use crate::pipeline::SampleMedia;
use crate::step::StepPolicy;
use crate::utils::ConfigValidator;

use super::env::EnvConfig;

/// 应用配置，JSON 格式
///
/// ```json
/// {
///   "llm": { "endpoint": "https://api.openai.com/v1", "model": "gpt-4o-mini", "api_key": "${OPENAI_API_KEY}" },
///   "steps": { "music": { "endpoint": "http://localhost:9000/music", "timeout_secs": 60, "retries": 1 } },
///   "pipelines": { "teaser": ["research", "script_writer"] },
///   "defaults": { "duration_secs": 30, "tone": "friendly" },
///   "sample_media": { "video_path": "samples/viral.mp4" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: Option<LlmSettings>,
    pub steps: BTreeMap<String, StepSettings>,
    pub pipelines: BTreeMap<String, Vec<String>>,
    pub defaults: RequestDefaults,
    pub sample_media: SampleMediaSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    /// 可以写成 `${ENV_VAR}`
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl LlmSettings {
    pub fn resolved_api_key(&self) -> Result<String> {
        EnvConfig::get_api_key(&self.api_key, "OPENAI_API_KEY")
    }
}

/// 外部 step 的服务配置
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub label: Option<String>,
}

impl StepSettings {
    /// 没有配置超时和重试时返回 None，沿用默认策略
    pub fn policy(&self) -> Option<StepPolicy> {
        if self.timeout_secs.is_none() && self.retries == 0 {
            return None;
        }
        let mut policy = StepPolicy::default().with_retries(self.retries);
        if let Some(secs) = self.timeout_secs {
            policy = policy.with_timeout(Duration::from_secs(secs));
        }
        Some(policy)
    }

    pub fn resolved_api_key(&self) -> Result<Option<String>> {
        self.api_key.as_deref().map(EnvConfig::resolve).transpose()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub duration_secs: Option<u32>,
    pub tone: Option<Tone>,
    pub city: Option<String>,
    pub output_type: Option<String>,
}

impl RequestDefaults {
    /// 把默认值写入请求构建器，调用方随后再覆盖自己明确指定的字段
    pub fn apply(&self, mut builder: CampaignRequestBuilder) -> CampaignRequestBuilder {
        if let Some(duration) = self.duration_secs {
            builder = builder.duration_secs(duration);
        }
        if let Some(tone) = &self.tone {
            builder = builder.tone(tone.clone());
        }
        if let Some(city) = &self.city {
            builder = builder.city(city.clone());
        }
        if let Some(output_type) = &self.output_type {
            builder = builder.output_type(output_type.clone());
        }
        builder
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleMediaSettings {
    pub video_path: Option<String>,
    pub music_path: Option<String>,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AdboardError::Config(format!("failed to parse config: {}", e)))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| AdboardError::Config(format!("failed to parse config value: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AdboardError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(llm) = &self.llm {
            ConfigValidator::validate_url(&llm.endpoint)?;
            if llm.model.trim().is_empty() {
                return Err(AdboardError::Config("llm model must not be empty".into()));
            }
            if let Some(temperature) = llm.temperature {
                ConfigValidator::validate_temperature(temperature)?;
            }
            if !llm.api_key.is_empty() && EnvConfig::env_reference(&llm.api_key).is_none() {
                ConfigValidator::validate_api_key(&llm.api_key)?;
            }
        }

        for (step, settings) in &self.steps {
            ConfigValidator::validate_step_id(step)?;
            if let Some(endpoint) = &settings.endpoint {
                ConfigValidator::validate_url(endpoint)?;
            }
            if settings.timeout_secs == Some(0) {
                return Err(AdboardError::Config(format!(
                    "step `{}` timeout_secs must be positive",
                    step
                )));
            }
        }

        for (name, steps) in &self.pipelines {
            ConfigValidator::validate_pipeline_name(name)?;
            for step in steps {
                ConfigValidator::validate_step_id(step)?;
            }
        }

        if self.defaults.duration_secs == Some(0) {
            return Err(AdboardError::Config(
                "defaults.duration_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn sample_media(&self) -> SampleMedia {
        SampleMedia {
            video_path: self.sample_media.video_path.clone(),
            music_path: self.sample_media.music_path.clone(),
        }
    }
}
