use std::fs;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use adboard::cli::{build_runner, load_config, pipeline_summaries};
use adboard::config::{build_registry, AppConfig, RequestDefaults};
use adboard::pipeline::steps::{MUSIC, VEO3_GENERATOR};
use adboard::{AdboardError, CampaignRequest, LocalEchoClient, StepPolicy, Tone};

#[test]
fn config_file_is_loaded_and_validated() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("adboard.json");
    fs::write(
        &path,
        json!({
            "steps": { "music": { "timeout_secs": 30, "retries": 1, "label": "Music is ready." } },
            "pipelines": { "teaser": ["research", "script_writer"] },
            "defaults": { "duration_secs": 30, "tone": "friendly", "city": "Boston" },
            "sample_media": { "video_path": "samples/viral.mp4" }
        })
        .to_string(),
    )?;

    let config = load_config(Some(path.as_path()))?;
    assert_eq!(config.defaults.duration_secs, Some(30));
    assert_eq!(config.defaults.tone, Some(Tone::Friendly));
    assert_eq!(
        config.steps[MUSIC].policy(),
        Some(
            StepPolicy::default()
                .with_retries(1)
                .with_timeout(Duration::from_secs(30))
        )
    );

    let runner = build_runner(&config)?;
    assert_eq!(runner.registry().policy_for(MUSIC).retries, 1);
    let summaries = pipeline_summaries(runner.registry());
    let teaser = summaries
        .iter()
        .find(|summary| summary.name == "teaser")
        .expect("teaser pipeline");
    assert_eq!(teaser.steps, vec!["research", "script_writer"]);
    Ok(())
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(dir.path().join("absent.json").as_path())).unwrap_err();
    assert!(matches!(err, AdboardError::Config(_)));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "defaults": { "duration_secs": 0 } }"#).unwrap();
    assert!(matches!(load_config(Some(path.as_path())), Err(AdboardError::Config(_))));

    fs::write(&path, "not json").unwrap();
    assert!(matches!(load_config(Some(path.as_path())), Err(AdboardError::Config(_))));
}

#[test]
fn no_config_means_defaults() -> anyhow::Result<()> {
    let config = load_config(None)?;
    assert!(config.llm.is_none());
    assert!(config.steps.is_empty());
    Ok(())
}

#[test]
fn request_defaults_fill_unset_fields() -> anyhow::Result<()> {
    let defaults = RequestDefaults {
        duration_secs: Some(60),
        tone: Some(Tone::Energetic),
        city: Some("Austin".into()),
        output_type: Some("pdf".into()),
    };

    let request = defaults
        .apply(CampaignRequest::builder("gym"))
        .city("Denver")
        .build()?;

    assert_eq!(request.duration_secs, 60);
    assert_eq!(request.tone, Tone::Energetic);
    assert_eq!(request.city.as_deref(), Some("Denver"));
    assert_eq!(request.output_type, "pdf");
    Ok(())
}

#[test]
fn config_pipeline_with_unknown_step_fails_registry_build() -> anyhow::Result<()> {
    let config = AppConfig::from_value(json!({
        "pipelines": { "odd": ["research", "hologram"] }
    }))?;
    let err = build_registry(&config, Arc::new(LocalEchoClient))
        .err()
        .expect("build should fail");
    assert!(matches!(err, AdboardError::UnknownStep(ref step) if step == "hologram"));
    Ok(())
}

#[test]
fn extra_configured_steps_are_registered() -> anyhow::Result<()> {
    let config = AppConfig::from_value(json!({
        "steps": { "hologram": { "label": "Hologram rendered." } },
        "pipelines": { "odd": ["research", "hologram"] }
    }))?;
    let registry = build_registry(&config, Arc::new(LocalEchoClient))?;
    assert!(registry.steps().contains("hologram"));
    assert_eq!(registry.resolve("odd")?.len(), 2);
    Ok(())
}

#[test]
fn sample_media_path_flows_into_stub() -> anyhow::Result<()> {
    let config = AppConfig::from_value(json!({
        "sample_media": { "video_path": "samples/viral.mp4" }
    }))?;
    let registry = build_registry(&config, Arc::new(LocalEchoClient))?;
    let request = CampaignRequest::builder("taco truck").build()?;

    let definition = registry.definition("full_campaign")?;
    let substitution = definition
        .substitutions
        .iter()
        .find(|sub| sub.step == VEO3_GENERATOR)
        .expect("veo3 substitution");
    let stub = substitution.stub_value(&request);
    assert_eq!(stub["video_path"], "samples/viral.mp4");
    assert_eq!(stub["enabled"], true);
    Ok(())
}
