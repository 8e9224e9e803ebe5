use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::sleep;

use adboard::{
    stub_static, AdboardError, CampaignRequest, FailureKind, FnProgress, PipelineDefinition,
    PipelineRegistry, PipelineRunner, ResultMap, RunStatus, StepAdapter, StepDisposition,
    StepOutcome, StepPolicy, Substitution,
};

#[derive(Clone)]
enum Behavior {
    Succeed(Value),
    Fail(FailureKind),
    Panic,
    Sleep(u64),
    /// 前 n 次返回 Transient，之后成功
    Flaky(u32),
}

struct ScriptedStep {
    name: &'static str,
    behavior: Behavior,
    calls: Arc<Mutex<Vec<String>>>,
    seen: Arc<Mutex<Vec<Vec<String>>>>,
    attempts: AtomicU32,
}

impl ScriptedStep {
    fn new(name: &'static str, behavior: Behavior, log: &Recorder) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: log.calls.clone(),
            seen: log.seen.clone(),
            attempts: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl StepAdapter for ScriptedStep {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self, _request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        self.calls.lock().push(self.name.to_string());
        self.seen
            .lock()
            .push(results.keys().map(str::to_string).collect());
        match &self.behavior {
            Behavior::Succeed(value) => StepOutcome::success(value.clone()),
            Behavior::Fail(FailureKind::Transient) => StepOutcome::transient("upstream 503"),
            Behavior::Fail(FailureKind::Configuration) => StepOutcome::configuration("missing key"),
            Behavior::Fail(FailureKind::Fatal) => StepOutcome::fatal("quota exhausted"),
            Behavior::Panic => panic!("adapter bug"),
            Behavior::Sleep(ms) => {
                sleep(Duration::from_millis(*ms)).await;
                StepOutcome::success(json!({"slept": ms}))
            }
            Behavior::Flaky(failures) => {
                let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < *failures {
                    StepOutcome::transient("flaky")
                } else {
                    StepOutcome::success(json!({"attempt": attempt + 1}))
                }
            }
        }
    }
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
    seen: Arc<Mutex<Vec<Vec<String>>>>,
    progress: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn progress_sink(&self) -> FnProgress<impl Fn(&str, &str) + Send + Sync> {
        let progress = self.progress.clone();
        FnProgress(move |step: &str, _label: &str| progress.lock().push(step.to_string()))
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

fn request() -> CampaignRequest {
    CampaignRequest::builder("taco truck")
        .industry("food")
        .city("Providence, RI")
        .output_type("mini")
        .build()
        .unwrap()
}

fn runner_for(
    steps: Vec<Arc<ScriptedStep>>,
    definition: PipelineDefinition,
) -> anyhow::Result<PipelineRunner> {
    let mut builder = PipelineRegistry::builder();
    for step in steps {
        let label = format!("{} done", step.name);
        builder = builder.step_with_label(step, label);
    }
    let registry = builder.pipeline(definition).build()?;
    Ok(PipelineRunner::new(Arc::new(registry)))
}

fn abc(log: &Recorder, b: Behavior) -> Vec<Arc<ScriptedStep>> {
    vec![
        ScriptedStep::new("step_a", Behavior::Succeed(json!({"x": 1})), log),
        ScriptedStep::new("step_b", b, log),
        ScriptedStep::new("step_c", Behavior::Succeed(json!({"z": 3})), log),
    ]
}

fn mini() -> PipelineDefinition {
    PipelineDefinition::new("mini", ["step_a", "step_b", "step_c"])
}

#[tokio::test]
async fn transient_failure_skips_step_and_continues() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Fail(FailureKind::Transient)), mini())?;

    let result = runner
        .run_pipeline("mini", &request(), Some(&log.progress_sink()))
        .await?;

    assert_eq!(result.status, RunStatus::PartialFailure);
    assert_eq!(result.results.get("step_a"), Some(&json!({"x": 1})));
    assert_eq!(result.results.get("step_c"), Some(&json!({"z": 3})));
    assert!(!result.results.contains("step_b"));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].step, "step_b");
    assert_eq!(result.errors[0].kind, FailureKind::Transient);
    assert_eq!(*log.progress.lock(), vec!["step_a", "step_c"]);

    // step_c 只能看到已经成功的 step_a
    let seen = log.seen.lock().clone();
    assert_eq!(seen[2], vec!["step_a".to_string()]);
    Ok(())
}

#[tokio::test]
async fn all_steps_succeed_in_order() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Succeed(json!({"y": 2}))), mini())?;

    let result = runner
        .run_pipeline("mini", &request(), Some(&log.progress_sink()))
        .await?;

    assert!(result.is_success());
    assert!(result.errors.is_empty());
    assert_eq!(
        result.results.keys().collect::<Vec<_>>(),
        vec!["step_a", "step_b", "step_c"]
    );
    assert_eq!(log.calls(), vec!["step_a", "step_b", "step_c"]);
    assert_eq!(*log.progress.lock(), vec!["step_a", "step_b", "step_c"]);
    assert_eq!(result.trace.len(), 3);
    assert!(result
        .trace
        .iter()
        .all(|entry| entry.disposition == StepDisposition::Succeeded));
    Ok(())
}

#[tokio::test]
async fn fatal_failure_aborts_remaining_steps() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Fail(FailureKind::Fatal)), mini())?;

    let result = runner
        .run_pipeline("mini", &request(), Some(&log.progress_sink()))
        .await?;

    assert_eq!(result.status, RunStatus::Aborted);
    assert_eq!(log.calls(), vec!["step_a", "step_b"]);
    assert_eq!(result.results.keys().collect::<Vec<_>>(), vec!["step_a"]);
    assert_eq!(result.error_for("step_b").map(|e| e.kind), Some(FailureKind::Fatal));
    assert_eq!(*log.progress.lock(), vec!["step_a"]);
    Ok(())
}

#[tokio::test]
async fn configuration_failure_is_recorded_and_not_retried() -> anyhow::Result<()> {
    let log = Recorder::default();
    let mut builder = PipelineRegistry::builder();
    for step in abc(&log, Behavior::Fail(FailureKind::Configuration)) {
        builder = builder.step(step);
    }
    let registry = builder
        .policy("step_b", StepPolicy::default().with_retries(3))?
        .pipeline(mini())
        .build()?;
    let runner = PipelineRunner::new(Arc::new(registry));

    let result = runner.run_pipeline("mini", &request(), None).await?;

    assert_eq!(result.status, RunStatus::PartialFailure);
    assert_eq!(log.calls(), vec!["step_a", "step_b", "step_c"]);
    assert_eq!(
        result.error_for("step_b").map(|e| e.kind),
        Some(FailureKind::Configuration)
    );
    Ok(())
}

#[tokio::test]
async fn unknown_pipeline_runs_nothing() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Succeed(json!({}))), mini())?;

    let err = runner
        .run_pipeline("does_not_exist", &request(), Some(&log.progress_sink()))
        .await
        .unwrap_err();

    assert!(matches!(err, AdboardError::UnknownPipeline(ref name) if name == "does_not_exist"));
    assert!(log.calls().is_empty());
    assert!(log.progress.lock().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_request_is_rejected_before_any_step() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Succeed(json!({}))), mini())?;
    let mut bad = request();
    bad.duration_secs = 0;

    let err = runner.run_pipeline("mini", &bad, None).await.unwrap_err();
    assert!(matches!(err, AdboardError::InvalidRequest(_)));

    // 流水线不存在时优先报告流水线错误
    let err = runner.run_pipeline("nope", &bad, None).await.unwrap_err();
    assert!(matches!(err, AdboardError::UnknownPipeline(_)));
    assert!(log.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn always_substitution_bypasses_adapter() -> anyhow::Result<()> {
    let log = Recorder::default();
    let definition = mini().with_substitution(Substitution::always(
        "step_b",
        stub_static(json!({"y": "stub"})),
    ));
    let runner = runner_for(abc(&log, Behavior::Fail(FailureKind::Fatal)), definition)?;

    let result = runner
        .run_pipeline("mini", &request(), Some(&log.progress_sink()))
        .await?;

    assert!(result.is_success());
    assert_eq!(log.calls(), vec!["step_a", "step_c"]);
    assert_eq!(result.results.get("step_b"), Some(&json!({"y": "stub"})));
    assert_eq!(result.trace[1].disposition, StepDisposition::Substituted);
    assert_eq!(*log.progress.lock(), vec!["step_a", "step_b", "step_c"]);

    // step_c 看不出 step_b 是替身数据
    assert_eq!(
        log.seen.lock()[1],
        vec!["step_a".to_string(), "step_b".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn conditional_substitution_follows_runner_conditions() -> anyhow::Result<()> {
    let log = Recorder::default();
    let definition = mini().with_substitution(Substitution::when(
        "sample_media",
        "step_b",
        stub_static(json!({"video_path": "samples/viral.mp4"})),
    ));
    let runner = runner_for(abc(&log, Behavior::Succeed(json!({"y": "live"}))), definition)?;

    let live = runner.run_pipeline("mini", &request(), None).await?;
    assert_eq!(live.results.get("step_b"), Some(&json!({"y": "live"})));
    assert_eq!(log.calls(), vec!["step_a", "step_b", "step_c"]);

    log.calls.lock().clear();
    let sampled = runner
        .clone()
        .with_condition("sample_media")
        .run_pipeline("mini", &request(), None)
        .await?;
    assert_eq!(
        sampled.results.field("step_b", "video_path"),
        Some(&json!("samples/viral.mp4"))
    );
    assert_eq!(log.calls(), vec!["step_a", "step_c"]);
    Ok(())
}

#[tokio::test]
async fn panicking_adapter_becomes_transient_failure() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Panic), mini())?;

    let result = runner.run_pipeline("mini", &request(), None).await?;

    assert_eq!(result.status, RunStatus::PartialFailure);
    let error = result.error_for("step_b").expect("step_b error");
    assert_eq!(error.kind, FailureKind::Transient);
    assert!(error.message.contains("adapter bug"));
    assert!(result.results.contains("step_c"));
    Ok(())
}

#[tokio::test]
async fn step_timeout_is_transient() -> anyhow::Result<()> {
    let log = Recorder::default();
    let mut builder = PipelineRegistry::builder();
    for step in abc(&log, Behavior::Sleep(500)) {
        builder = builder.step(step);
    }
    let registry = builder
        .policy(
            "step_b",
            StepPolicy::default().with_timeout(Duration::from_millis(20)),
        )?
        .pipeline(mini())
        .build()?;
    let runner = PipelineRunner::new(Arc::new(registry));

    let result = runner.run_pipeline("mini", &request(), None).await?;

    let error = result.error_for("step_b").expect("step_b error");
    assert_eq!(error.kind, FailureKind::Transient);
    assert!(error.message.contains("timed out"));
    assert!(result.results.contains("step_c"));
    Ok(())
}

#[tokio::test]
async fn transient_failures_are_retried_per_policy() -> anyhow::Result<()> {
    let log = Recorder::default();
    let mut builder = PipelineRegistry::builder();
    for step in abc(&log, Behavior::Flaky(1)) {
        builder = builder.step(step);
    }
    let registry = builder
        .policy("step_b", StepPolicy::default().with_retries(2))?
        .pipeline(mini())
        .build()?;
    let runner = PipelineRunner::new(Arc::new(registry));

    let result = runner.run_pipeline("mini", &request(), None).await?;

    assert!(result.is_success());
    assert_eq!(result.results.get("step_b"), Some(&json!({"attempt": 2})));
    assert_eq!(log.calls(), vec!["step_a", "step_b", "step_b", "step_c"]);
    Ok(())
}

#[tokio::test]
async fn without_retries_a_flaky_step_fails_once() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Flaky(1)), mini())?;

    let result = runner.run_pipeline("mini", &request(), None).await?;

    assert_eq!(result.status, RunStatus::PartialFailure);
    assert_eq!(log.calls(), vec!["step_a", "step_b", "step_c"]);
    Ok(())
}

#[tokio::test]
async fn concurrent_runs_do_not_share_results() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Sleep(10)), mini())?;
    let first = request();
    let second = CampaignRequest::builder("coffee shop")
        .output_type("mini")
        .build()?;

    let (a, b) = tokio::join!(
        runner.run_pipeline("mini", &first, None),
        runner.run_pipeline("mini", &second, None)
    );
    let (a, b) = (a?, b?);

    assert_eq!(a.results.len(), 3);
    assert_eq!(b.results.len(), 3);
    assert!(a.is_success() && b.is_success());
    assert_eq!(log.calls().len(), 6);
    Ok(())
}

#[tokio::test]
async fn result_serializes_with_trace() -> anyhow::Result<()> {
    let log = Recorder::default();
    let runner = runner_for(abc(&log, Behavior::Fail(FailureKind::Transient)), mini())?;

    let result = runner.run_pipeline("mini", &request(), None).await?;
    let value = serde_json::to_value(&result)?;

    assert_eq!(value["status"], json!("partial_failure"));
    assert_eq!(value["results"]["step_a"], json!({"x": 1}));
    assert_eq!(value["errors"][0]["kind"], json!("transient"));
    assert_eq!(value["trace"][1]["disposition"], json!("failed"));
    assert_eq!(value["trace"][1]["kind"], json!("transient"));
    Ok(())
}

#[tokio::test]
async fn results_keep_pipeline_order_when_serialized() -> anyhow::Result<()> {
    let log = Recorder::default();
    let steps = vec![
        ScriptedStep::new("zeta", Behavior::Succeed(json!(0)), &log),
        ScriptedStep::new("alpha", Behavior::Succeed(json!(0)), &log),
    ];
    let definition = PipelineDefinition::new("reversed", ["zeta", "alpha"])
        .with_substitution(Substitution::always("zeta", stub_static(json!(1))))
        .with_substitution(Substitution::always("alpha", stub_static(json!(2))));
    let runner = runner_for(steps, definition)?;

    let result = runner.run_pipeline("reversed", &request(), None).await?;

    assert_eq!(result.results.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    assert_eq!(serde_json::to_string(&result.results)?, r#"{"zeta":1,"alpha":2}"#);
    Ok(())
}
