use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use adboard::config::{build_registry, AppConfig};
use adboard::pipeline::steps::{
    LOCATION_SCOUT, LYRIA_MUSIC, RESEARCH, SCRIPT_WRITER, TREND_ANALYZER, VEO3_GENERATOR,
};
use adboard::pipeline::standard_pipelines;
use adboard::{
    stub_static, AdboardError, CampaignRequest, LocalEchoClient, PipelineDefinition,
    PipelineRegistry, ResultMap, StepAdapter, StepOutcome, Substitution, SubstitutionCondition,
};

struct NamedStep {
    name: &'static str,
    dependencies: &'static [&'static str],
}

#[async_trait]
impl StepAdapter for NamedStep {
    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self) -> &[&'static str] {
        self.dependencies
    }

    async fn execute(&self, _request: &CampaignRequest, _results: &ResultMap) -> StepOutcome {
        StepOutcome::success(json!({}))
    }
}

fn step(name: &'static str) -> Arc<NamedStep> {
    Arc::new(NamedStep {
        name,
        dependencies: &[],
    })
}

fn dependent(name: &'static str, dependencies: &'static [&'static str]) -> Arc<NamedStep> {
    Arc::new(NamedStep { name, dependencies })
}

#[test]
fn resolve_returns_registered_order() -> anyhow::Result<()> {
    let registry = PipelineRegistry::builder()
        .step(step("a"))
        .step(step("b"))
        .pipeline(PipelineDefinition::new("ab", ["b", "a"]))
        .build()?;

    assert_eq!(registry.resolve("ab")?, ["b".to_string(), "a".to_string()]);
    assert!(registry.contains("ab"));
    assert_eq!(registry.pipeline_names(), vec!["ab"]);
    Ok(())
}

#[test]
fn unknown_output_type_has_no_fallback() -> anyhow::Result<()> {
    let registry = PipelineRegistry::builder()
        .step(step("a"))
        .pipeline(PipelineDefinition::new("full_campaign", ["a"]))
        .build()?;

    let err = registry.resolve("video_please").unwrap_err();
    assert!(matches!(err, AdboardError::UnknownPipeline(ref name) if name == "video_please"));
    Ok(())
}

#[test]
fn unregistered_step_is_rejected_at_build() {
    let err = PipelineRegistry::builder()
        .step(step("a"))
        .pipeline(PipelineDefinition::new("broken", ["a", "ghost"]))
        .build()
        .err()
        .expect("build should fail");
    assert!(matches!(err, AdboardError::UnknownStep(ref name) if name == "ghost"));
}

#[test]
fn duplicate_step_is_rejected() {
    let err = PipelineRegistry::builder()
        .step(step("a"))
        .pipeline(PipelineDefinition::new("twice", ["a", "a"]))
        .build()
        .err()
        .expect("build should fail");
    assert!(matches!(err, AdboardError::DuplicateStep { .. }));
}

#[test]
fn empty_pipeline_is_rejected() {
    let err = PipelineRegistry::builder()
        .pipeline(PipelineDefinition::new("nothing", Vec::<String>::new()))
        .build()
        .err()
        .expect("build should fail");
    assert!(matches!(err, AdboardError::EmptyPipeline(_)));
}

#[test]
fn dependency_must_come_first() {
    let err = PipelineRegistry::builder()
        .step(step("research"))
        .step(dependent("trend_analyzer", &["research"]))
        .pipeline(PipelineDefinition::new("backwards", ["trend_analyzer", "research"]))
        .build()
        .err()
        .expect("build should fail");
    match err {
        AdboardError::DependencyOrder {
            step, dependency, ..
        } => {
            assert_eq!(step, "trend_analyzer");
            assert_eq!(dependency, "research");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(PipelineRegistry::builder()
        .step(step("research"))
        .step(dependent("trend_analyzer", &["research"]))
        .pipeline(PipelineDefinition::new("forwards", ["research", "trend_analyzer"]))
        .build()
        .is_ok());
}

#[test]
fn substitution_must_target_a_pipeline_step() {
    let err = PipelineRegistry::builder()
        .step(step("a"))
        .pipeline(
            PipelineDefinition::new("p", ["a"])
                .with_substitution(Substitution::always("b", stub_static(json!({})))),
        )
        .build()
        .err()
        .expect("build should fail");
    assert!(matches!(err, AdboardError::InvalidSubstitution { .. }));
}

#[test]
fn global_substitution_only_lands_where_step_exists() -> anyhow::Result<()> {
    let registry = PipelineRegistry::builder()
        .step(step("a"))
        .step(step("b"))
        .pipeline(PipelineDefinition::new("with_b", ["a", "b"]))
        .pipeline(PipelineDefinition::new("without_b", ["a"]))
        .substitute_everywhere(Substitution::when("sample_media", "b", stub_static(json!(1))))
        .build()?;

    assert_eq!(registry.definition("with_b")?.substitutions.len(), 1);
    assert!(registry.definition("without_b")?.substitutions.is_empty());
    Ok(())
}

#[test]
fn later_definition_replaces_earlier_one() -> anyhow::Result<()> {
    let registry = PipelineRegistry::builder()
        .step(step("a"))
        .step(step("b"))
        .pipeline(PipelineDefinition::new("p", ["a"]))
        .pipeline(PipelineDefinition::new("p", ["a", "b"]))
        .build()?;
    assert_eq!(registry.resolve("p")?.len(), 2);
    Ok(())
}

#[test]
fn registered_label_wins_over_adapter_label() -> anyhow::Result<()> {
    let registry = PipelineRegistry::builder()
        .step_with_label(step("a"), "A is done")
        .step(step("b"))
        .pipeline(PipelineDefinition::new("p", ["a", "b"]))
        .build()?;
    let request = CampaignRequest::builder("bakery").build()?;

    assert_eq!(registry.label_for("a", &request).as_deref(), Some("A is done"));
    assert_eq!(registry.label_for("b", &request), None);
    Ok(())
}

#[test]
fn standard_registry_builds_from_empty_config() -> anyhow::Result<()> {
    let registry = build_registry(&AppConfig::default(), Arc::new(LocalEchoClient))?;

    for definition in standard_pipelines() {
        assert!(registry.contains(&definition.name), "{}", definition.name);
    }
    assert_eq!(
        &registry.resolve("script")?[..],
        [RESEARCH, LOCATION_SCOUT, TREND_ANALYZER, SCRIPT_WRITER]
    );

    let quick = registry.definition("quick_full")?;
    let always: Vec<&str> = quick
        .substitutions
        .iter()
        .filter(|sub| sub.condition == SubstitutionCondition::Always)
        .map(|sub| sub.step.as_str())
        .collect();
    assert_eq!(always, vec![RESEARCH, LOCATION_SCOUT, TREND_ANALYZER]);

    let full = registry.definition("full_campaign")?;
    let conditional: Vec<&str> = full
        .substitutions
        .iter()
        .map(|sub| sub.step.as_str())
        .collect();
    assert_eq!(conditional, vec![VEO3_GENERATOR, LYRIA_MUSIC]);
    Ok(())
}

#[test]
fn config_pipelines_are_registered() -> anyhow::Result<()> {
    let config = AppConfig::from_value(json!({
        "pipelines": { "teaser": ["research", "script_writer"] },
        "steps": { "research": { "label": "Looked around the market." } }
    }))?;
    let registry = build_registry(&config, Arc::new(LocalEchoClient))?;
    let request = CampaignRequest::builder("bakery").build()?;

    assert_eq!(registry.resolve("teaser")?.len(), 2);
    assert_eq!(
        registry.label_for(RESEARCH, &request).as_deref(),
        Some("Looked around the market.")
    );
    Ok(())
}
