use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AdboardError, Result};

use super::adapter::StepAdapter;

/// 单个 step 的超时与重试策略，默认都不启用
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepPolicy {
    pub timeout: Option<Duration>,
    pub retries: u32,
}

impl StepPolicy {
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

#[derive(Clone)]
struct StepEntry {
    adapter: Arc<dyn StepAdapter>,
    label: Option<String>,
    policy: StepPolicy,
}

#[derive(Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<String, StepEntry>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// 注册 step；同名 step 会被替换
    pub fn register(&mut self, adapter: Arc<dyn StepAdapter>) -> &mut Self {
        let name = adapter.name().to_string();
        let previous = self.steps.remove(&name);
        self.steps.insert(
            name,
            StepEntry {
                adapter,
                label: previous.as_ref().and_then(|entry| entry.label.clone()),
                policy: previous.map(|entry| entry.policy).unwrap_or_default(),
            },
        );
        self
    }

    pub fn set_label(&mut self, step: &str, label: impl Into<String>) -> Result<&mut Self> {
        let entry = self
            .steps
            .get_mut(step)
            .ok_or_else(|| AdboardError::UnknownStep(step.to_string()))?;
        entry.label = Some(label.into());
        Ok(self)
    }

    pub fn set_policy(&mut self, step: &str, policy: StepPolicy) -> Result<&mut Self> {
        let entry = self
            .steps
            .get_mut(step)
            .ok_or_else(|| AdboardError::UnknownStep(step.to_string()))?;
        entry.policy = policy;
        Ok(self)
    }

    pub fn get(&self, step: &str) -> Option<Arc<dyn StepAdapter>> {
        self.steps.get(step).map(|entry| Arc::clone(&entry.adapter))
    }

    pub fn label(&self, step: &str) -> Option<&str> {
        self.steps.get(step).and_then(|entry| entry.label.as_deref())
    }

    pub fn policy(&self, step: &str) -> StepPolicy {
        self.steps
            .get(step)
            .map(|entry| entry.policy.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, step: &str) -> bool {
        self.steps.contains_key(step)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
