use async_trait::async_trait;

use crate::campaign::CampaignRequest;
use crate::state::ResultMap;

use super::outcome::StepOutcome;

/// 流水线中的一个 step
///
/// 每个外部能力（调研、脚本、配图、配音……）都实现这个 trait。
/// 失败必须以 `StepOutcome::Failure` 返回；`results` 只读，
/// 只包含本次运行中排在前面、已经成功的 step 输出。
#[async_trait]
pub trait StepAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// 必须排在本 step 之前的 step，注册表构建时校验
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// 完成后展示给用户的进度文案
    fn progress_label(&self, _request: &CampaignRequest) -> Option<String> {
        None
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome;
}
