//! 脚本撰写 - 按分镜输出画面、音效和旁白

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::campaign::CampaignRequest;
use crate::llm::{DynLlmClient, LlmRequest};
use crate::pipeline::steps::{LOCATION_SCOUT, RESEARCH, SCRIPT_WRITER, TREND_ANALYZER};
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

/// 单条广告脚本的最长时长（秒）
pub const MAX_SCRIPT_DURATION_SECS: u32 = 600;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    pub scene_number: usize,
    pub timing: String,
    pub title: String,
    pub visual: String,
    pub audio: String,
    pub voiceover: String,
}

#[derive(Clone, Copy)]
enum Field {
    Visual,
    Audio,
    Voiceover,
}

pub struct ScriptWriterStep {
    llm: DynLlmClient,
}

impl ScriptWriterStep {
    pub fn new(llm: DynLlmClient) -> Self {
        Self { llm }
    }

    fn build_prompt(request: &CampaignRequest, results: &ResultMap) -> String {
        let analysis = results
            .field(TREND_ANALYZER, "analysis")
            .cloned()
            .unwrap_or(Value::Null);
        let text = |key: &str, fallback: &str| {
            analysis
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        let mut structure = String::new();
        if let Some(items) = analysis.get("ad_structure").and_then(Value::as_array) {
            for item in items {
                structure.push_str(&format!(
                    "- {}: {} - {}\n",
                    item["time"].as_str().unwrap_or(""),
                    item["element"].as_str().unwrap_or(""),
                    item["description"].as_str().unwrap_or("")
                ));
            }
        }
        if structure.is_empty() {
            structure.push_str("Standard: Hook -> Problem -> Solution -> Social Proof -> CTA\n");
        }

        let key_messages = analysis
            .get("key_messages")
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|joined| !joined.is_empty())
            .unwrap_or_else(|| "Highlight unique value".to_string());

        let insights = results
            .field(RESEARCH, "competitor_insights")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|item| format!("- {}\n", item))
                    .collect::<String>()
            })
            .unwrap_or_else(|| "- Focus on clear value proposition\n".to_string());

        let location = results
            .field(LOCATION_SCOUT, "locations")
            .and_then(Value::as_array)
            .and_then(|locations| locations.first())
            .and_then(|first| first["name"].as_str())
            .map(|name| format!("Filming location: {}\n", name))
            .unwrap_or_default();

        let city = request
            .city
            .as_deref()
            .map(|city| format!(" in {}", city))
            .unwrap_or_default();
        let d = u64::from(request.duration_secs);

        format!(
            "Write a {d}-second {tone} video ad script for {product}{city} ({industry}).\n\n\
             Research insights:\n{insights}\
             - Recommended hook: {hook}\n\
             - Visual style: {visual}\n\
             - Key messages: {key_messages}\n\
             - Call-to-action: {cta}\n\
             {location}\n\
             Structure guidance:\n{structure}\n\
             Write the script in this exact format, five scenes:\n\
             SCENE 1 (0-{s1}s): [HOOK]\n\
             Visual: [what we see]\n\
             Audio: [music and sound]\n\
             Voiceover: \"[exact words]\"\n\
             ...\n\
             SCENE 5 ({s4}-{d}s): [CTA]\n\n\
             Keep the voiceover under {words} words and make it sound like people actually talk.",
            d = d,
            tone = request.tone,
            product = request.product,
            city = city,
            industry = request.industry,
            insights = insights,
            hook = text("recommended_hook", "Attention-grabbing visual"),
            visual = text("visual_style", "Professional and engaging"),
            key_messages = key_messages,
            cta = text("cta", "Visit us today"),
            location = location,
            structure = structure,
            s1 = d / 6,
            s4 = d * 3 / 4,
            words = d * 5 / 2,
        )
    }
}

/// 解析 `SCENE n (timing): [TITLE]` 格式的脚本
pub fn parse_scenes(script: &str) -> Vec<Scene> {
    let mut scenes = Vec::new();
    for block in script.split("SCENE ").skip(1) {
        let mut lines = block.trim().lines();
        let mut scene = Scene {
            scene_number: scenes.len() + 1,
            ..Scene::default()
        };

        if let Some(header) = lines.next() {
            if let (Some(open), Some(close)) = (header.find('('), header.find(')')) {
                if open < close {
                    scene.timing = header[open + 1..close].to_string();
                }
            }
            if let Some((_, title)) = header.rsplit_once(':') {
                scene.title = title.trim().trim_matches(|c| c == '[' || c == ']').to_string();
            }
        }

        let mut current: Option<Field> = None;
        for line in lines {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("Visual:") {
                current = Some(Field::Visual);
                scene.visual = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("Audio:") {
                current = Some(Field::Audio);
                scene.audio = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("Voiceover:") {
                current = Some(Field::Voiceover);
                scene.voiceover = rest.trim().trim_matches('"').to_string();
            } else if let (Some(field), false) = (current, line.is_empty()) {
                let target = match field {
                    Field::Visual => &mut scene.visual,
                    Field::Audio => &mut scene.audio,
                    Field::Voiceover => &mut scene.voiceover,
                };
                target.push(' ');
                target.push_str(line.trim_matches('"'));
            }
        }

        if !scene.visual.is_empty() || !scene.voiceover.is_empty() {
            scenes.push(scene);
        }
    }
    scenes
}

fn fallback_scene(duration_secs: u32) -> Scene {
    Scene {
        scene_number: 1,
        timing: format!("0-{}s", duration_secs),
        title: "Full Ad".into(),
        visual: "See full script".into(),
        audio: "Background music".into(),
        voiceover: String::new(),
    }
}

#[async_trait]
impl StepAdapter for ScriptWriterStep {
    fn name(&self) -> &str {
        SCRIPT_WRITER
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        if request.duration_secs > MAX_SCRIPT_DURATION_SECS {
            return StepOutcome::configuration(format!(
                "duration of {}s exceeds the {}s script limit",
                request.duration_secs, MAX_SCRIPT_DURATION_SECS
            ));
        }
        let prompt = LlmRequest::new(Self::build_prompt(request, results))
            .with_temperature(0.7)
            .with_max_tokens(2000);
        let response = match self.llm.complete(prompt).await {
            Ok(response) => response,
            Err(err) => return StepOutcome::from_result(Err(err)),
        };

        let script = response.content.trim();
        if script.is_empty() {
            return StepOutcome::transient("model returned an empty script");
        }

        let mut scenes = parse_scenes(script);
        if scenes.is_empty() {
            scenes.push(fallback_scene(request.duration_secs));
        }
        let voiceover_text = scenes
            .iter()
            .map(|scene| scene.voiceover.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        StepOutcome::success(json!({
            "script": script,
            "scene_count": scenes.len(),
            "scenes": scenes,
            "voiceover_text": voiceover_text,
            "estimated_duration": request.duration_secs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "---\n\
        SCENE 1 (0-7s): [HOOK]\n\
        Visual: Steam rising off a fresh taco\n\
        Audio: Sizzle\n\
        Voiceover: \"Hungry?\"\n\
        \n\
        SCENE 2 (7-15s): [CTA]\n\
        Visual: The truck at golden hour\n\
        with a line of customers\n\
        Voiceover: \"Come find us.\"\n";

    #[test]
    fn parses_scene_blocks() {
        let scenes = parse_scenes(SCRIPT);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].timing, "0-7s");
        assert_eq!(scenes[0].title, "HOOK");
        assert_eq!(scenes[0].voiceover, "Hungry?");
        assert_eq!(
            scenes[1].visual,
            "The truck at golden hour with a line of customers"
        );
        assert_eq!(scenes[1].scene_number, 2);
    }

    #[test]
    fn prose_yields_no_scenes() {
        assert!(parse_scenes("Here is an idea for your ad.").is_empty());
    }
}
