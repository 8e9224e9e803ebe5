//! 运行结果转换成给用户的文字

use serde::Serialize;
use serde_json::Value;

use crate::pipeline::steps::*;
use crate::runtime::StepError;
use crate::state::ResultMap;
use crate::step::FailureKind;

const EMPTY_SUMMARY: &str = "Your campaign package is ready. Check the output folder for files.";

/// 交付物位置
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub storyboard_url: Option<String>,
    pub viral_url: Option<String>,
    pub pdf_url: Option<String>,
    /// 故事板视频的本地路径，用于生成预览
    pub video_path: Option<String>,
}

fn string_field(entry: Option<&Value>, key: &str) -> Option<String> {
    entry
        .and_then(|value| value.get(key))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl DeliverySummary {
    pub fn from_results(results: &ResultMap) -> Self {
        let storyboard = results.get(VIDEO_ASSEMBLY);
        let viral = results.get(VIRAL_VIDEO_ASSEMBLER);
        let pdf = results.get(PDF_BUILDER);

        let video_path = string_field(storyboard, "final_video_path");
        Self {
            storyboard_url: string_field(storyboard, "video_url").or_else(|| video_path.clone()),
            viral_url: string_field(viral, "video_url")
                .or_else(|| string_field(viral, "final_video_path")),
            pdf_url: string_field(pdf, "pdf_url").or_else(|| string_field(pdf, "pdf_path")),
            video_path,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.storyboard_url.is_none() && self.viral_url.is_none() && self.pdf_url.is_none()
    }

    pub fn text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(url) = &self.storyboard_url {
            lines.push(format!("View Storyboard Video Here: {}", url));
        }
        if let Some(url) = &self.viral_url {
            lines.push(format!("View Viral Video Here: {}", url));
        }
        if let Some(url) = &self.pdf_url {
            lines.push(format!("View Full Analysis PDF: {}", url));
        }
        if lines.is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            lines.join("\n\n")
        }
    }
}

fn deliverable_name(step: &str) -> &str {
    match step {
        RESEARCH => "market research",
        LOCATION_SCOUT => "filming locations",
        TREND_ANALYZER => "trend analysis",
        SCRIPT_WRITER => "script",
        IMAGE_GENERATOR => "storyboard frames",
        VOICEOVER => "voiceover",
        MUSIC | LYRIA_MUSIC => "music",
        AUDIO_MIXER => "audio mix",
        VIDEO_ASSEMBLY => "storyboard video",
        VEO3_GENERATOR | VIRAL_VIDEO_ASSEMBLER => "viral video",
        COST_ESTIMATOR => "budget estimate",
        SOCIAL_MEDIA => "social media plan",
        PDF_BUILDER => "campaign PDF",
        other => other,
    }
}

fn reason(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Transient => "temporarily unavailable",
        FailureKind::Configuration => "not set up yet",
        FailureKind::Fatal => "stopped the run",
    }
}

/// 用用户能理解的话说明哪些部分没有做出来；没有失败时返回 None
///
/// 成功但带 `error` 字段的输出是 step 自己降级出的默认内容，也会列出来。
pub fn describe_degradation(errors: &[StepError], results: &ResultMap) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for error in errors {
        let part = format!("{} ({})", deliverable_name(&error.step), reason(error.kind));
        if !parts.contains(&part) {
            parts.push(part);
        }
    }

    let mut defaults: Vec<&str> = Vec::new();
    for step in results.keys() {
        if !results.has_usable(step) {
            let name = deliverable_name(step);
            if !defaults.contains(&name) {
                defaults.push(name);
            }
        }
    }

    let mut notes = Vec::new();
    if !parts.is_empty() {
        notes.push(format!(
            "Some parts could not be produced this time: {}.",
            parts.join(", ")
        ));
    }
    if !defaults.is_empty() {
        notes.push(format!(
            "These parts use a standard template instead of a custom version: {}.",
            defaults.join(", ")
        ));
    }
    if notes.is_empty() {
        None
    } else {
        Some(notes.join(" "))
    }
}
