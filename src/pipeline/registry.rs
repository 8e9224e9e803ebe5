use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::campaign::CampaignRequest;
use crate::error::{AdboardError, Result};
use crate::step::{StepAdapter, StepPolicy, StepRegistry};

use super::definition::PipelineDefinition;
use super::substitution::Substitution;

/// 流水线注册表，构建完成后只读
///
/// 所有流水线引用的 step 都在 `build()` 时校验，运行期间不会再出现未注册的 step。
pub struct PipelineRegistry {
    steps: StepRegistry,
    pipelines: HashMap<String, PipelineDefinition>,
}

impl PipelineRegistry {
    pub fn builder() -> PipelineRegistryBuilder {
        PipelineRegistryBuilder::new()
    }

    /// 输出类型对应的 step 顺序；未注册的类型直接报错，不回退到默认流水线
    pub fn resolve(&self, output_type: &str) -> Result<&[String]> {
        self.definition(output_type)
            .map(|definition| definition.steps.as_slice())
    }

    pub fn definition(&self, output_type: &str) -> Result<&PipelineDefinition> {
        self.pipelines
            .get(output_type)
            .ok_or_else(|| AdboardError::UnknownPipeline(output_type.to_string()))
    }

    pub fn adapter_for(&self, step: &str) -> Result<Arc<dyn StepAdapter>> {
        self.steps
            .get(step)
            .ok_or_else(|| AdboardError::UnknownStep(step.to_string()))
    }

    /// 注册表里的文案优先，其次是 step 自己提供的文案
    pub fn label_for(&self, step: &str, request: &CampaignRequest) -> Option<String> {
        if let Some(label) = self.steps.label(step) {
            return Some(label.to_string());
        }
        self.steps
            .get(step)
            .and_then(|adapter| adapter.progress_label(request))
    }

    pub fn policy_for(&self, step: &str) -> StepPolicy {
        self.steps.policy(step)
    }

    pub fn contains(&self, output_type: &str) -> bool {
        self.pipelines.contains_key(output_type)
    }

    pub fn pipeline_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn steps(&self) -> &StepRegistry {
        &self.steps
    }
}

#[derive(Default)]
pub struct PipelineRegistryBuilder {
    steps: StepRegistry,
    definitions: Vec<PipelineDefinition>,
    global_substitutions: Vec<Substitution>,
}

impl PipelineRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, adapter: Arc<dyn StepAdapter>) -> Self {
        self.steps.register(adapter);
        self
    }

    pub fn step_with_label(mut self, adapter: Arc<dyn StepAdapter>, label: impl Into<String>) -> Self {
        let name = adapter.name().to_string();
        self.steps.register(adapter);
        // 刚注册过，set_label 不会失败
        let _ = self.steps.set_label(&name, label);
        self
    }

    pub fn label(mut self, step: &str, label: impl Into<String>) -> Result<Self> {
        self.steps.set_label(step, label)?;
        Ok(self)
    }

    pub fn policy(mut self, step: &str, policy: StepPolicy) -> Result<Self> {
        self.steps.set_policy(step, policy)?;
        Ok(self)
    }

    /// 同名流水线以后注册的为准
    pub fn pipeline(mut self, definition: PipelineDefinition) -> Self {
        self.definitions.retain(|existing| existing.name != definition.name);
        self.definitions.push(definition);
        self
    }

    /// 对所有包含该 step 的流水线追加同一个替身
    pub fn substitute_everywhere(mut self, substitution: Substitution) -> Self {
        self.global_substitutions.push(substitution);
        self
    }

    pub fn steps_mut(&mut self) -> &mut StepRegistry {
        &mut self.steps
    }

    pub fn build(self) -> Result<PipelineRegistry> {
        let mut pipelines = HashMap::new();
        for mut definition in self.definitions {
            for substitution in &self.global_substitutions {
                if definition.contains(&substitution.step) {
                    definition.substitutions.push(substitution.clone());
                }
            }
            validate_definition(&definition, &self.steps)?;
            debug!(
                pipeline = %definition.name,
                steps = definition.steps.len(),
                substitutions = definition.substitutions.len(),
                "pipeline registered"
            );
            pipelines.insert(definition.name.clone(), definition);
        }
        Ok(PipelineRegistry {
            steps: self.steps,
            pipelines,
        })
    }
}

fn validate_definition(definition: &PipelineDefinition, steps: &StepRegistry) -> Result<()> {
    if definition.steps.is_empty() {
        return Err(AdboardError::EmptyPipeline(definition.name.clone()));
    }

    let mut seen = HashSet::new();
    for step in &definition.steps {
        if !seen.insert(step.as_str()) {
            return Err(AdboardError::DuplicateStep {
                pipeline: definition.name.clone(),
                step: step.clone(),
            });
        }
        let adapter = steps
            .get(step)
            .ok_or_else(|| AdboardError::UnknownStep(step.clone()))?;

        for dependency in adapter.dependencies() {
            // seen 此时只包含排在当前 step 之前（以及它自己）的 step
            if *dependency == step.as_str() || !seen.contains(*dependency) {
                return Err(AdboardError::DependencyOrder {
                    pipeline: definition.name.clone(),
                    step: step.clone(),
                    dependency: dependency.to_string(),
                });
            }
        }
    }

    for substitution in &definition.substitutions {
        if !definition.contains(&substitution.step) {
            return Err(AdboardError::InvalidSubstitution {
                pipeline: definition.name.clone(),
                step: substitution.step.clone(),
            });
        }
    }
    Ok(())
}
