use super::definition::PipelineDefinition;
use super::registry::PipelineRegistryBuilder;
use super::steps::*;
use super::stubs;
use super::substitution::Substitution;

/// step 完成后发给用户的进度文案
pub const PROGRESS_LABELS: &[(&str, &str)] = &[
    (RESEARCH, "Research done. Writing your script."),
    (LOCATION_SCOUT, "Found filming locations. Writing your script."),
    (TREND_ANALYZER, "Analyzed what works in ads like yours. Writing the script."),
    (SCRIPT_WRITER, "Script is ready. Generating storyboard frames for both packages."),
    (IMAGE_GENERATOR, "Storyboard frames are done. Assembling the concept video."),
    (VIDEO_ASSEMBLY, "Concept video is ready. Building your full campaign package."),
    (COST_ESTIMATOR, "Budget estimated. Building your PDF with hiring and cost details."),
    (SOCIAL_MEDIA, "Social strategy ready. Building your campaign PDF."),
    (PDF_BUILDER, "Almost done. Finalizing your storyboard and viral packages."),
    (VEO3_GENERATOR, "Generating viral video. Adding music next."),
    (LYRIA_MUSIC, "Music added. Assembling viral clip."),
    (VIRAL_VIDEO_ASSEMBLER, "Viral video is ready. Finalizing your packages."),
];

const RESEARCH_STAGE: [&str; 4] = [RESEARCH, LOCATION_SCOUT, TREND_ANALYZER, SCRIPT_WRITER];

/// 样例素材位置，`sample_media` 条件启用时使用
#[derive(Clone, Debug, Default)]
pub struct SampleMedia {
    pub video_path: Option<String>,
    pub music_path: Option<String>,
}

fn with_research(rest: &[&'static str]) -> Vec<&'static str> {
    RESEARCH_STAGE.iter().copied().chain(rest.iter().copied()).collect()
}

fn full_campaign_steps() -> Vec<&'static str> {
    with_research(&[
        IMAGE_GENERATOR,
        VIDEO_ASSEMBLY,
        VEO3_GENERATOR,
        LYRIA_MUSIC,
        VIRAL_VIDEO_ASSEMBLER,
        COST_ESTIMATOR,
        SOCIAL_MEDIA,
        PDF_BUILDER,
    ])
}

/// 跳过慢速调研：调研、选址、趋势三个 step 始终使用替身数据
fn skip_research(definition: PipelineDefinition) -> PipelineDefinition {
    definition
        .with_substitution(Substitution::always(RESEARCH, stubs::research_stub()))
        .with_substitution(Substitution::always(LOCATION_SCOUT, stubs::locations_stub()))
        .with_substitution(Substitution::always(TREND_ANALYZER, stubs::trends_stub()))
}

pub fn standard_pipelines() -> Vec<PipelineDefinition> {
    vec![
        PipelineDefinition::new("script", RESEARCH_STAGE),
        PipelineDefinition::new("storyboard", with_research(&[IMAGE_GENERATOR])),
        PipelineDefinition::new("video", with_research(&[IMAGE_GENERATOR, VOICEOVER, MUSIC])),
        PipelineDefinition::new(
            "pdf",
            [
                RESEARCH,
                TREND_ANALYZER,
                SCRIPT_WRITER,
                IMAGE_GENERATOR,
                COST_ESTIMATOR,
                LOCATION_SCOUT,
                PDF_BUILDER,
            ],
        ),
        PipelineDefinition::new(
            "full",
            [
                RESEARCH,
                TREND_ANALYZER,
                SCRIPT_WRITER,
                IMAGE_GENERATOR,
                VOICEOVER,
                MUSIC,
                COST_ESTIMATOR,
                LOCATION_SCOUT,
                PDF_BUILDER,
            ],
        ),
        PipelineDefinition::new(
            "audio_package",
            with_research(&[VOICEOVER, MUSIC, AUDIO_MIXER, SOCIAL_MEDIA]),
        ),
        PipelineDefinition::new("preproduction", with_research(&[COST_ESTIMATOR, SOCIAL_MEDIA])),
        PipelineDefinition::new(
            "full_no_visual",
            with_research(&[VOICEOVER, MUSIC, AUDIO_MIXER, COST_ESTIMATOR, SOCIAL_MEDIA]),
        ),
        PipelineDefinition::new(
            "storyboard_video",
            with_research(&[
                IMAGE_GENERATOR,
                VIDEO_ASSEMBLY,
                COST_ESTIMATOR,
                SOCIAL_MEDIA,
                PDF_BUILDER,
            ]),
        ),
        PipelineDefinition::new(
            "viral_video",
            [
                RESEARCH,
                TREND_ANALYZER,
                SCRIPT_WRITER,
                VEO3_GENERATOR,
                LYRIA_MUSIC,
                VIRAL_VIDEO_ASSEMBLER,
            ],
        ),
        PipelineDefinition::new(
            "viral_video_test",
            [SCRIPT_WRITER, VEO3_GENERATOR, LYRIA_MUSIC, VIRAL_VIDEO_ASSEMBLER],
        ),
        PipelineDefinition::new("full_campaign", full_campaign_steps()),
        skip_research(PipelineDefinition::new(
            "quick_test",
            with_research(&[
                IMAGE_GENERATOR,
                VIDEO_ASSEMBLY,
                COST_ESTIMATOR,
                SOCIAL_MEDIA,
                PDF_BUILDER,
            ]),
        )),
        skip_research(PipelineDefinition::new("quick_full", full_campaign_steps())),
    ]
}

/// 注册标准流水线、进度文案以及样例素材替身
///
/// 只给已经注册过的 step 设置文案，所以要在注册完 step 之后调用。
pub fn register_standard_pipelines(
    mut builder: PipelineRegistryBuilder,
    sample_media: &SampleMedia,
) -> PipelineRegistryBuilder {
    for definition in standard_pipelines() {
        builder = builder.pipeline(definition);
    }
    for (step, label) in PROGRESS_LABELS {
        if builder.steps_mut().contains(step) {
            // contains 已经检查过，这里不会失败
            let _ = builder.steps_mut().set_label(step, *label);
        }
    }
    builder
        .substitute_everywhere(Substitution::when(
            CONDITION_SAMPLE_MEDIA,
            VEO3_GENERATOR,
            stubs::sample_video_stub(sample_media.video_path.clone()),
        ))
        .substitute_everywhere(Substitution::when(
            CONDITION_SAMPLE_MEDIA,
            LYRIA_MUSIC,
            stubs::sample_music_stub(sample_media.music_path.clone()),
        ))
}
