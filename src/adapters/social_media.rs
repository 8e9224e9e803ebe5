//! 社交媒体投放策略

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::campaign::{CampaignRequest, Tone};
use crate::llm::{DynLlmClient, LlmRequest};
use crate::pipeline::steps::{SCRIPT_WRITER, SOCIAL_MEDIA};
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

pub struct SocialMediaStep {
    llm: DynLlmClient,
}

impl SocialMediaStep {
    pub fn new(llm: DynLlmClient) -> Self {
        Self { llm }
    }
}

fn industry_tags(industry: &str) -> &'static [&'static str] {
    match industry {
        "food" => &["#FoodPorn", "#Foodie", "#FoodLover", "#InstaFood", "#Delicious"],
        "fitness" => &["#Fitness", "#FitLife", "#Workout", "#HealthyLiving", "#FitnessMotivation"],
        "tech" => &["#Tech", "#Innovation", "#TechNews", "#Startup", "#Digital"],
        "beauty" => &["#Beauty", "#BeautyTips", "#Skincare", "#MakeupLover", "#SelfCare"],
        _ => &["#SmallBusiness", "#LocalBusiness", "#ShopLocal"],
    }
}

pub fn hashtags(industry: &str, city: Option<&str>, tone: &Tone) -> Value {
    let location: Vec<String> = city
        .and_then(|city| city.split(',').next())
        .map(|name| name.trim().replace(' ', ""))
        .filter(|name| !name.is_empty())
        .map(|name| vec![format!("#{}", name), format!("#{}Business", name)])
        .unwrap_or_default();
    let tone_tags: Vec<&str> = match tone {
        Tone::Funny => vec!["#Humor"],
        Tone::Professional => vec!["#Professional"],
        _ => Vec::new(),
    };
    json!({
        "primary": industry_tags(&industry.to_lowercase()),
        "location": location,
        "tone": tone_tags,
    })
}

pub fn platform_priorities(industry: &str) -> Value {
    let platforms: [(&str, &str); 3] = match industry.to_lowercase().as_str() {
        "food" => [
            ("Instagram", "Reels + Stories"),
            ("TikTok", "Short-form video"),
            ("Facebook", "Feed post + story"),
        ],
        "fitness" => [
            ("Instagram", "Reels + IGTV"),
            ("TikTok", "Workout videos"),
            ("YouTube", "Shorts"),
        ],
        "tech" => [
            ("LinkedIn", "Feed post + article"),
            ("Twitter/X", "Thread + video"),
            ("Instagram", "Reels"),
        ],
        _ => [
            ("Instagram", "Reels"),
            ("Facebook", "Feed post"),
            ("TikTok", "Video"),
        ],
    };
    Value::Array(
        platforms
            .iter()
            .enumerate()
            .map(|(idx, (name, format))| {
                json!({ "name": name, "priority": idx + 1, "format": format })
            })
            .collect(),
    )
}

fn quick_captions(product: &str, voiceover: Option<&str>) -> Value {
    let hook = voiceover
        .filter(|text| !text.is_empty())
        .map(|text| text.chars().take(100).collect::<String>())
        .unwrap_or_else(|| format!("Check out {}!", product));
    json!({
        "main": format!("{}... Visit us today!", hook),
        "short": format!("You NEED to see this! #{}", product.replace(' ', "")),
        "cta": format!("Ready to experience {}? Click the link in bio!", product),
    })
}

pub fn fallback_strategy(request: &CampaignRequest) -> Value {
    json!({
        "platforms": ["Instagram", "Facebook", "TikTok"],
        "posting_times": ["Mon-Fri 12pm-2pm", "Wed-Thu 6pm-8pm"],
        "hashtags": ["#SmallBusiness", "#LocalBusiness", format!("#{}", request.industry)],
        "caption": format!("Discover {}! Visit us today.", request.product),
        "tip": "Post during peak engagement hours and use location tags",
    })
}

fn build_prompt(request: &CampaignRequest, results: &ResultMap) -> String {
    let overview: String = results
        .field(SCRIPT_WRITER, "scenes")
        .and_then(Value::as_array)
        .map(|scenes| {
            scenes
                .iter()
                .take(3)
                .map(|scene| format!("- {}\n", scene["title"].as_str().unwrap_or("")))
                .collect()
        })
        .unwrap_or_default();

    format!(
        "You are a social media marketing expert. Create a distribution strategy for this ad.\n\n\
         Product: {product}\nIndustry: {industry}\nDuration: {duration} seconds\nTone: {tone}\n\
         Location: {location}\n\nAd overview:\n{overview}\n\
         Cover the top 3 platforms, captions, hashtags, posting schedule, engagement tactics \
         and a budget recommendation.",
        product = request.product,
        industry = request.industry,
        duration = request.duration_secs,
        tone = request.tone,
        location = request.city.as_deref().unwrap_or("General market"),
        overview = overview,
    )
}

#[async_trait]
impl StepAdapter for SocialMediaStep {
    fn name(&self) -> &str {
        SOCIAL_MEDIA
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        let prompt = LlmRequest::new(build_prompt(request, results))
            .with_temperature(0.7)
            .with_max_tokens(1500);
        let strategy = match self.llm.complete(prompt).await {
            Ok(response) => response.content.trim().to_string(),
            Err(err) => {
                warn!(step = SOCIAL_MEDIA, error = %err, "llm unavailable, using fallback strategy");
                return StepOutcome::success(json!({
                    "error": err.to_string(),
                    "fallback": fallback_strategy(request),
                }));
            }
        };

        let voiceover = results
            .field(SCRIPT_WRITER, "voiceover_text")
            .and_then(Value::as_str);
        StepOutcome::success(json!({
            "strategy": strategy,
            "hashtags": hashtags(&request.industry, request.city.as_deref(), &request.tone),
            "platforms": platform_priorities(&request.industry),
            "quick_captions": quick_captions(&request.product, voiceover),
        }))
    }
}
