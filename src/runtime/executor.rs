use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::campaign::CampaignRequest;
use crate::error::Result;
use crate::pipeline::{PipelineRegistry, RunConditions};
use crate::state::ResultMap;
use crate::step::{FailureKind, StepAdapter, StepOutcome, StepPolicy};

use super::progress::ProgressSink;
use super::run::PipelineRun;
use super::types::{PipelineRunResult, StepDisposition};

/// 顺序执行流水线
///
/// 注册表只读共享；每次 `run_pipeline` 都有自己的结果表，
/// 所以同一个 runner 可以被多个任务同时使用。
#[derive(Clone)]
pub struct PipelineRunner {
    registry: Arc<PipelineRegistry>,
    conditions: RunConditions,
}

impl PipelineRunner {
    pub fn new(registry: Arc<PipelineRegistry>) -> Self {
        Self {
            registry,
            conditions: RunConditions::new(),
        }
    }

    pub fn with_conditions(mut self, conditions: RunConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.insert(condition);
        self
    }

    pub fn conditions(&self) -> &RunConditions {
        &self.conditions
    }

    pub fn registry(&self) -> &Arc<PipelineRegistry> {
        &self.registry
    }

    /// 按输出类型执行对应流水线
    ///
    /// 只有流水线不存在或请求不合法时返回 `Err`，此时没有任何 step 被调用。
    /// step 级别的失败记录在结果的 `errors` 中。
    pub async fn run_pipeline(
        &self,
        output_type: &str,
        request: &CampaignRequest,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<PipelineRunResult> {
        let definition = self.registry.definition(output_type)?;
        request.validate()?;

        let mut run = PipelineRun::new(definition);
        run.start();
        info!(
            pipeline = %definition.name,
            steps = definition.steps.len(),
            product = %request.product,
            "starting pipeline run"
        );

        while let Some(step) = run.current_step() {
            let started = Instant::now();

            if let Some(substitution) = definition.active_substitution(step, &self.conditions) {
                debug!(pipeline = %definition.name, step, "using stub data");
                run.record_success(
                    step,
                    substitution.stub_value(request),
                    StepDisposition::Substituted,
                    started.elapsed(),
                );
            } else {
                let adapter = self.registry.adapter_for(step)?;
                let policy = self.registry.policy_for(step);
                let outcome =
                    invoke_step(adapter.as_ref(), step, &policy, request, run.results()).await;

                match outcome {
                    StepOutcome::Success(payload) => {
                        debug!(pipeline = %definition.name, step, "step succeeded");
                        run.record_success(
                            step,
                            payload,
                            StepDisposition::Succeeded,
                            started.elapsed(),
                        );
                    }
                    StepOutcome::Failure(failure) => {
                        warn!(
                            pipeline = %definition.name,
                            step,
                            kind = %failure.kind,
                            error = %failure.message,
                            "step failed"
                        );
                        let fatal = failure.kind.is_fatal();
                        run.record_failure(step, failure, started.elapsed());
                        run.advance();
                        if fatal {
                            warn!(pipeline = %definition.name, step, "aborting pipeline run");
                        }
                        continue;
                    }
                }
            }

            if let Some(sink) = progress {
                if let Some(label) = self.registry.label_for(step, request) {
                    sink.notify(step, &label).await;
                }
            }
            run.advance();
        }

        run.complete();
        debug!(pipeline = %definition.name, phase = ?run.phase(), "run completed");
        let result = run.finish();
        info!(
            pipeline = %result.pipeline,
            status = ?result.status,
            completed = result.results.len(),
            failed = result.errors.len(),
            "pipeline run finished"
        );
        Ok(result)
    }
}

/// 调用 step，按策略处理超时与重试；只有 Transient 失败会重试
async fn invoke_step(
    adapter: &dyn StepAdapter,
    step: &str,
    policy: &StepPolicy,
    request: &CampaignRequest,
    results: &ResultMap,
) -> StepOutcome {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let outcome = guarded_execute(adapter, step, policy.timeout, request, results).await;
        match outcome {
            StepOutcome::Failure(ref failure)
                if failure.kind == FailureKind::Transient && attempt <= policy.retries =>
            {
                warn!(step, attempt, error = %failure.message, "retrying step");
            }
            other => return other,
        }
    }
}

/// step 内部的 panic 与超时都转换成 Transient 失败
async fn guarded_execute(
    adapter: &dyn StepAdapter,
    step: &str,
    limit: Option<Duration>,
    request: &CampaignRequest,
    results: &ResultMap,
) -> StepOutcome {
    let task = AssertUnwindSafe(adapter.execute(request, results)).catch_unwind();
    let caught = match limit {
        Some(duration) => match timeout(duration, task).await {
            Ok(caught) => caught,
            Err(_) => {
                return StepOutcome::transient(format!(
                    "step `{}` timed out after {}ms",
                    step,
                    duration.as_millis()
                ))
            }
        },
        None => task.await,
    };
    caught.unwrap_or_else(|payload| {
        StepOutcome::transient(format!("step `{}` panicked: {}", step, panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
