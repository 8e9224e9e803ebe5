//! 从聊天消息中提取广告需求

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::campaign::{CampaignRequest, Tone, DEFAULT_OUTPUT_TYPE};
use crate::config::RequestDefaults;
use crate::error::{AdboardError, Result};
use crate::llm::{extract_json, DynLlmClient, LlmRequest};

pub const QUICK_FULL: &str = "quick_full";

const AD_KEYWORDS: &[&str] = &[
    "ad",
    "ads",
    "advertisement",
    "commercial",
    "storyboard",
    "script",
    "video",
    "marketing",
    "promo",
    "promotional",
    "campaign",
    "viral",
];

/// 关键词 → (产品, 行业)，按顺序匹配
const PRODUCT_INDUSTRY: &[(&str, &str, &str)] = &[
    ("taco", "taco truck", "food"),
    ("food truck", "food truck", "food"),
    ("restaurant", "restaurant", "food"),
    ("coffee", "coffee shop", "food"),
    ("gym", "gym", "fitness"),
    ("fitness", "fitness app", "fitness"),
    ("app", "app", "tech"),
    ("software", "software", "tech"),
    ("roofing", "roofing company", "construction"),
    ("plumber", "plumbing service", "services"),
    ("salon", "salon", "beauty"),
    ("car", "car dealership", "automotive"),
];

const QUICK_PHRASES: &[&str] = &["quick test", "test without research"];

/// 从一条消息中解析出的广告需求
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignIntent {
    pub is_ad_request: bool,
    pub product: Option<String>,
    pub industry: Option<String>,
    pub output_type: Option<String>,
    pub duration: Option<u32>,
    pub tone: Option<Tone>,
    pub city: Option<String>,
    pub ready: bool,
    pub missing: Vec<String>,
}

impl CampaignIntent {
    /// 产品是唯一的必填项，`ready` 与 `missing` 以此为准
    pub fn finalize(mut self) -> Self {
        self.product = self
            .product
            .take()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self.ready = self.product.is_some();
        self.missing.retain(|field| field != "product");
        if !self.ready {
            self.missing.insert(0, "product".to_string());
        }
        self
    }

    /// 合并配置默认值，生成流水线请求
    pub fn to_request(&self, output_type: &str, defaults: &RequestDefaults) -> Result<CampaignRequest> {
        let product = self
            .product
            .clone()
            .ok_or_else(|| AdboardError::InvalidRequest("product is missing".into()))?;

        let mut builder = defaults.apply(CampaignRequest::builder(product));
        if let Some(industry) = &self.industry {
            builder = builder.industry(industry.clone());
        }
        if let Some(duration) = self.duration {
            builder = builder.duration_secs(duration);
        }
        if let Some(tone) = &self.tone {
            builder = builder.tone(tone.clone());
        }
        if let Some(city) = &self.city {
            builder = builder.city(city.clone());
        }
        builder.output_type(output_type).build()
    }
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// 单词按整词匹配（允许复数 s），多词短语按子串匹配
fn mentions(lower: &str, tokens: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') {
        return lower.contains(keyword);
    }
    tokens
        .iter()
        .any(|token| *token == keyword || token.strip_suffix('s') == Some(keyword))
}

fn detect_output_type(lower: &str, tokens: &[&str]) -> Option<&'static str> {
    if lower.contains("full package") || mentions(lower, tokens, "everything") || mentions(lower, tokens, "viral") {
        Some("full_campaign")
    } else if lower.contains("storyboard only") || lower.contains("no viral") {
        Some("storyboard_video")
    } else if mentions(lower, tokens, "pdf")
        || mentions(lower, tokens, "budget")
        || lower.contains("production package")
    {
        Some("pdf")
    } else if mentions(lower, tokens, "video") {
        Some("full_campaign")
    } else if mentions(lower, tokens, "script") && !mentions(lower, tokens, "storyboard") {
        Some("script")
    } else {
        None
    }
}

fn detect_duration(lower: &str) -> Option<u32> {
    if ["30 second", "30s", "30-second"].iter().any(|p| lower.contains(p)) {
        Some(30)
    } else if ["60 second", "60s", "60-second", "1 minute"]
        .iter()
        .any(|p| lower.contains(p))
    {
        Some(60)
    } else {
        None
    }
}

fn detect_tone(tokens: &[&str], lower: &str) -> Option<Tone> {
    let any = |keys: &[&str]| keys.iter().any(|key| mentions(lower, tokens, key));
    if any(&["funny", "humor", "comedic"]) {
        Some(Tone::Funny)
    } else if any(&["emotional", "heartfelt"]) {
        Some(Tone::Other("emotional".to_string()))
    } else if any(&["energetic", "exciting", "dynamic"]) {
        Some(Tone::Energetic)
    } else if any(&["friendly", "warm"]) {
        Some(Tone::Friendly)
    } else {
        None
    }
}

/// 取 " in " 之后首字母大写的词作为城市，例如 "coffee shop in Boston"
fn detect_city(text: &str) -> Option<String> {
    let idx = text.rfind(" in ")?;
    let mut parts: Vec<&str> = Vec::new();
    for raw in text[idx + 4..].split_whitespace() {
        let word = raw.trim_end_matches(|c: char| c == '.' || c == '!' || c == '?');
        let starts_upper = word.chars().next().map_or(false, char::is_uppercase);
        if !starts_upper {
            break;
        }
        parts.push(word);
        if word.ends_with(',') && parts.len() > 1 {
            break;
        }
        if word.len() != raw.len() {
            break;
        }
    }
    let city = parts.join(" ");
    let city = city.trim_end_matches(',').trim();
    if city.is_empty() {
        None
    } else {
        Some(city.to_string())
    }
}

/// 基于关键词的规则提取，不需要调用模型
pub fn extract_intent_simple(text: &str) -> CampaignIntent {
    let lower = text.to_lowercase();
    let tokens = words(&lower);

    let mut intent = CampaignIntent {
        is_ad_request: AD_KEYWORDS.iter().any(|kw| mentions(&lower, &tokens, kw)),
        output_type: detect_output_type(&lower, &tokens).map(str::to_string),
        duration: detect_duration(&lower),
        tone: detect_tone(&tokens, &lower),
        city: detect_city(text),
        ..CampaignIntent::default()
    };

    if let Some((_, product, industry)) = PRODUCT_INDUSTRY
        .iter()
        .find(|(keyword, _, _)| mentions(&lower, &tokens, keyword))
    {
        intent.product = Some((*product).to_string());
        intent.industry = Some((*industry).to_string());
    }
    intent.finalize()
}

/// 规范输出类型：快速测试改走 quick_full，`video`/`full` 统一为 full_campaign
pub fn normalize_output_type(output_type: Option<&str>, text: &str, quick_full: bool) -> String {
    let lower = text.to_lowercase();
    if quick_full || QUICK_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return QUICK_FULL.to_string();
    }
    match output_type.map(str::trim).filter(|value| !value.is_empty()) {
        Some("video") | Some("full") | None => DEFAULT_OUTPUT_TYPE.to_string(),
        Some(other) => other.to_string(),
    }
}

/// 意图提取器：有模型时先问模型，失败再回退到规则
#[derive(Clone, Default)]
pub struct IntentExtractor {
    llm: Option<DynLlmClient>,
}

impl IntentExtractor {
    pub fn rule_based() -> Self {
        Self { llm: None }
    }

    pub fn with_llm(llm: DynLlmClient) -> Self {
        Self { llm: Some(llm) }
    }

    pub async fn extract(&self, text: &str) -> CampaignIntent {
        let Some(llm) = &self.llm else {
            return extract_intent_simple(text);
        };

        let request = LlmRequest::new(build_prompt(text))
            .with_temperature(0.1)
            .with_max_tokens(500);
        match llm.complete(request).await {
            Ok(response) => {
                let parsed = extract_json(&response.content)
                    .and_then(|value| serde_json::from_value::<CampaignIntent>(value).ok());
                match parsed {
                    Some(intent) => {
                        debug!(?intent, "intent extracted by model");
                        intent.finalize()
                    }
                    None => {
                        warn!("model answer was not a valid intent, using rules");
                        extract_intent_simple(text)
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "intent extraction failed, using rules");
                extract_intent_simple(text)
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Analyze this message and extract ad creation intent.\n\
         Message: \"{text}\"\n\n\
         Return ONLY a JSON object with the fields is_ad_request (bool), product (string or null), \
         industry (food/fitness/tech/retail/services/construction/beauty/automotive/general), \
         output_type (script/storyboard/storyboard_video/full_campaign/pdf, default full_campaign), \
         duration (30/45/60 or null), tone (professional/funny/emotional/energetic or null), \
         city (string or null), ready (true when the product is known) and missing (list of \
         missing required fields).",
        text = text
    )
}
