use async_trait::async_trait;

use crate::campaign::CampaignRequest;
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

/// 没有配置服务端点的外部 step，执行时总是返回 Configuration 失败
pub struct UnconfiguredStep {
    name: String,
}

impl UnconfiguredStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl StepAdapter for UnconfiguredStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _request: &CampaignRequest, _results: &ResultMap) -> StepOutcome {
        StepOutcome::configuration(format!("no endpoint configured for step `{}`", self.name))
    }
}
