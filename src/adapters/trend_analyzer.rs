//! 趋势分析 - 把调研数据提炼成可执行的创意建议

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::campaign::CampaignRequest;
use crate::llm::{extract_json, DynLlmClient, LlmRequest};
use crate::pipeline::steps::{RESEARCH, TREND_ANALYZER};
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

const DEPENDENCIES: &[&str] = &[RESEARCH];

pub struct TrendAnalyzerStep {
    llm: DynLlmClient,
}

impl TrendAnalyzerStep {
    pub fn new(llm: DynLlmClient) -> Self {
        Self { llm }
    }

    fn build_prompt(request: &CampaignRequest, research: &Value) -> String {
        let mut videos = String::new();
        if let Some(top) = research.get("top_videos").and_then(Value::as_array) {
            for (idx, video) in top.iter().take(5).enumerate() {
                videos.push_str(&format!(
                    "{}. {} - {} views\n",
                    idx + 1,
                    video["title"].as_str().unwrap_or("Unknown"),
                    video["views"].as_u64().unwrap_or(0)
                ));
            }
        }
        let patterns = &research["patterns_identified"];
        let list = |key: &str| {
            patterns
                .get(key)
                .map(Value::to_string)
                .unwrap_or_else(|| "[\"Not available\"]".to_string())
        };

        format!(
            "You are an expert advertising strategist. Analyze this research data and provide \
             actionable insights for creating a {duration}-second {tone} ad for a {product} in the \
             {industry} industry.\n\n\
             Top performing videos:\n{videos}\n\
             Common hooks: {hooks}\n\
             Visual styles: {visuals}\n\
             Effective CTAs: {ctas}\n\n\
             Answer with a JSON object with the fields recommended_hook, ad_structure \
             (list of {{time, element, description}} covering all {duration} seconds), visual_style, \
             audio_approach, key_messages, cta, unique_angle and warnings.",
            duration = request.duration_secs,
            tone = request.tone,
            product = request.product,
            industry = request.industry,
            videos = videos,
            hooks = list("common_hooks"),
            visuals = list("visual_styles"),
            ctas = list("effective_ctas"),
        )
    }
}

#[async_trait]
impl StepAdapter for TrendAnalyzerStep {
    fn name(&self) -> &str {
        TREND_ANALYZER
    }

    fn dependencies(&self) -> &[&'static str] {
        DEPENDENCIES
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        let research = match results.get(RESEARCH) {
            Some(research) if results.has_usable(RESEARCH) => research,
            _ => return StepOutcome::configuration("no research data available"),
        };

        let prompt = LlmRequest::new(Self::build_prompt(request, research))
            .with_temperature(0.3)
            .with_max_tokens(1500);
        let response = match self.llm.complete(prompt).await {
            Ok(response) => response,
            Err(err) => return StepOutcome::from_result(Err(err)),
        };

        let analysis = extract_json(&response.content)
            .unwrap_or_else(|| json!({ "raw_analysis": response.content.trim() }));

        StepOutcome::success(json!({
            "analysis": analysis,
            "product": request.product,
            "industry": request.industry,
            "target_duration": request.duration_secs,
            "tone": request.tone,
        }))
    }
}
