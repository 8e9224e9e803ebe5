/// 标准 step 标识

pub const RESEARCH: &str = "research";
pub const LOCATION_SCOUT: &str = "location_scout";
pub const TREND_ANALYZER: &str = "trend_analyzer";
pub const SCRIPT_WRITER: &str = "script_writer";
pub const IMAGE_GENERATOR: &str = "image_generator";
pub const VOICEOVER: &str = "voiceover";
pub const MUSIC: &str = "music";
pub const AUDIO_MIXER: &str = "audio_mixer";
pub const VIDEO_ASSEMBLY: &str = "video_assembly";
pub const COST_ESTIMATOR: &str = "cost_estimator";
pub const SOCIAL_MEDIA: &str = "social_media";
pub const PDF_BUILDER: &str = "pdf_builder";
pub const VEO3_GENERATOR: &str = "veo3_generator";
pub const LYRIA_MUSIC: &str = "lyria_music";
pub const VIRAL_VIDEO_ASSEMBLER: &str = "viral_video_assembler";

/// 由外部服务（HTTP）提供的 step
pub const VENDOR_STEPS: &[&str] = &[
    RESEARCH,
    LOCATION_SCOUT,
    IMAGE_GENERATOR,
    VOICEOVER,
    MUSIC,
    AUDIO_MIXER,
    VIDEO_ASSEMBLY,
    PDF_BUILDER,
    VEO3_GENERATOR,
    LYRIA_MUSIC,
    VIRAL_VIDEO_ASSEMBLER,
];

/// 运行条件：用样例素材代替付费的视频/音乐生成
pub const CONDITION_SAMPLE_MEDIA: &str = "sample_media";
