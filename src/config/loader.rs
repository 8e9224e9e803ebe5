//! 按配置组装标准流水线注册表

use std::sync::Arc;

use tracing::info;
#[cfg(not(feature = "http-client"))]
use tracing::warn;

use crate::adapters::{
    CostEstimatorStep, ScriptWriterStep, SocialMediaStep, TrendAnalyzerStep, UnconfiguredStep,
};
use crate::error::Result;
use crate::llm::{DynLlmClient, LocalEchoClient};
use crate::pipeline::steps::VENDOR_STEPS;
use crate::pipeline::{register_standard_pipelines, PipelineDefinition, PipelineRegistry};
use crate::step::StepAdapter;

use super::settings::{AppConfig, StepSettings};

/// 组装注册表：LLM 驱动的 step、配置了端点的外部 step，其余外部 step 占位
pub fn build_registry(config: &AppConfig, llm: DynLlmClient) -> Result<PipelineRegistry> {
    config.validate()?;

    let mut builder = PipelineRegistry::builder()
        .step(Arc::new(TrendAnalyzerStep::new(llm.clone())))
        .step(Arc::new(ScriptWriterStep::new(llm.clone())))
        .step(Arc::new(CostEstimatorStep::new(llm.clone())))
        .step(Arc::new(SocialMediaStep::new(llm)));

    for step in VENDOR_STEPS {
        builder = builder.step(vendor_step(step, config.steps.get(*step))?);
    }
    for (step, settings) in &config.steps {
        if !builder.steps_mut().contains(step) {
            builder = builder.step(vendor_step(step, Some(settings))?);
        }
    }

    builder = register_standard_pipelines(builder, &config.sample_media());
    for (name, steps) in &config.pipelines {
        builder = builder.pipeline(PipelineDefinition::new(name.clone(), steps.iter().cloned()));
    }

    for (step, settings) in &config.steps {
        if let Some(label) = &settings.label {
            builder = builder.label(step, label.clone())?;
        }
        if let Some(policy) = settings.policy() {
            builder = builder.policy(step, policy)?;
        }
    }

    let registry = builder.build()?;
    info!(pipelines = registry.pipeline_names().len(), "pipeline registry ready");
    Ok(registry)
}

/// 有 `llm` 配置时使用 HTTP 客户端，否则使用离线客户端
pub fn build_llm_client(config: &AppConfig) -> Result<DynLlmClient> {
    let Some(settings) = &config.llm else {
        return Ok(Arc::new(LocalEchoClient));
    };

    #[cfg(feature = "http-client")]
    {
        let api_key = settings.resolved_api_key()?;
        let mut client = crate::llm::OpenAiCompatClient::new(
            settings.endpoint.clone(),
            api_key,
            settings.model.clone(),
        )?;
        if let Some(temperature) = settings.temperature {
            client = client.with_temperature(temperature);
        }
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "http-client"))]
    {
        warn!(
            endpoint = %settings.endpoint,
            "http-client feature disabled, falling back to the offline llm client"
        );
        Ok(Arc::new(LocalEchoClient))
    }
}

fn vendor_step(step: &str, settings: Option<&StepSettings>) -> Result<Arc<dyn StepAdapter>> {
    let Some(endpoint) = settings.and_then(|s| s.endpoint.as_ref()) else {
        return Ok(Arc::new(UnconfiguredStep::new(step)));
    };

    #[cfg(feature = "http-client")]
    {
        let api_key = settings.map(StepSettings::resolved_api_key).transpose()?.flatten();
        Ok(Arc::new(crate::adapters::HttpStep::new(
            step,
            endpoint.clone(),
            api_key,
        )?))
    }

    #[cfg(not(feature = "http-client"))]
    {
        warn!(
            step,
            endpoint = %endpoint,
            "http-client feature disabled, step stays unconfigured"
        );
        Ok(Arc::new(UnconfiguredStep::new(step)))
    }
}
