use std::time::Duration;

use serde_json::Value;

use crate::pipeline::PipelineDefinition;
use crate::state::ResultMap;
use crate::step::StepFailure;

use super::types::{
    PipelineRunResult, RunPhase, RunStatus, StepDisposition, StepError, StepTrace,
};

/// 单次流水线运行的可变状态
///
/// 只由执行器持有。`complete()` 之后阶段变为 `Completed`，再通过 `finish()` 交出结果。
pub struct PipelineRun<'a> {
    definition: &'a PipelineDefinition,
    cursor: usize,
    phase: RunPhase,
    aborted: bool,
    results: ResultMap,
    errors: Vec<StepError>,
    trace: Vec<StepTrace>,
}

impl<'a> PipelineRun<'a> {
    pub fn new(definition: &'a PipelineDefinition) -> Self {
        Self {
            definition,
            cursor: 0,
            phase: RunPhase::Pending,
            aborted: false,
            results: ResultMap::new(),
            errors: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        if self.phase == RunPhase::Pending {
            self.phase = RunPhase::Running;
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn pipeline(&self) -> &str {
        &self.definition.name
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 当前待执行的 step；运行结束或已中止时返回 None
    pub fn current_step(&self) -> Option<&'a str> {
        if self.phase != RunPhase::Running || self.aborted {
            return None;
        }
        self.definition.steps.get(self.cursor).map(String::as_str)
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn record_success(
        &mut self,
        step: &str,
        payload: Value,
        disposition: StepDisposition,
        elapsed: Duration,
    ) {
        self.results.insert(step, payload);
        self.push_trace(step, disposition, elapsed);
    }

    pub fn record_failure(&mut self, step: &str, failure: StepFailure, elapsed: Duration) {
        self.push_trace(step, StepDisposition::Failed(failure.kind), elapsed);
        if failure.kind.is_fatal() {
            self.aborted = true;
        }
        self.errors.push(StepError {
            step: step.to_string(),
            kind: failure.kind,
            message: failure.message,
        });
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    fn push_trace(&mut self, step: &str, disposition: StepDisposition, elapsed: Duration) {
        self.trace.push(StepTrace {
            step: step.to_string(),
            disposition,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    fn status(&self) -> RunStatus {
        if self.aborted {
            RunStatus::Aborted
        } else if self.errors.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure
        }
    }

    /// 结束运行并定下最终状态；重复调用返回同一个状态
    pub fn complete(&mut self) -> RunStatus {
        if let RunPhase::Completed(status) = self.phase {
            return status;
        }
        let status = self.status();
        self.phase = RunPhase::Completed(status);
        status
    }

    pub fn finish(mut self) -> PipelineRunResult {
        let status = self.complete();
        PipelineRunResult {
            pipeline: self.definition.name.clone(),
            results: self.results,
            errors: self.errors,
            status,
            trace: self.trace,
        }
    }
}
