use serde::Serialize;

use crate::state::ResultMap;
use crate::step::FailureKind;

/// 运行结果状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// 所有 step 都成功（或被替身数据代替）
    Success,
    /// 有 step 失败，但运行走完了全部 step
    PartialFailure,
    /// 某个 step 返回 Fatal，后续 step 未执行
    Aborted,
}

/// 单次运行的生命周期
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Running,
    Completed(RunStatus),
}

/// 失败 step 的记录
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub step: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", content = "kind", rename_all = "snake_case")]
pub enum StepDisposition {
    Succeeded,
    Substituted,
    Failed(FailureKind),
}

#[derive(Clone, Debug, Serialize)]
pub struct StepTrace {
    pub step: String,
    #[serde(flatten)]
    pub disposition: StepDisposition,
    pub elapsed_ms: u64,
}

/// 流水线运行结果
#[derive(Clone, Debug, Serialize)]
pub struct PipelineRunResult {
    pub pipeline: String,
    pub results: ResultMap,
    pub errors: Vec<StepError>,
    pub status: RunStatus,
    pub trace: Vec<StepTrace>,
}

impl PipelineRunResult {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    pub fn error_for(&self, step: &str) -> Option<&StepError> {
        self.errors.iter().find(|err| err.step == step)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|err| err.step.as_str())
    }
}
