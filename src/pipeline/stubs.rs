//! 快速迭代用的替身数据
//!
//! 这些值与真实 step 的输出结构一致，挂在同一个 step 标识下，
//! 下游 step 无法区分数据来源。

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::campaign::CampaignRequest;

use super::substitution::{stub_from_fn, StubFn};

const DEFAULT_CITY: &str = "Providence, RI";

static FOOD_RESEARCH: Lazy<Value> = Lazy::new(|| {
    json!({
        "industry": "food",
        "product": "taco truck",
        "query_terms": [
            "taco truck commercial",
            "food truck advertisement",
            "street food marketing video"
        ],
        "top_videos": [
            {"title": "Best Taco Truck in LA - Customer Reactions", "channel": "FoodieVibes", "views": 2_400_000, "likes": 89_000, "duration": "0:42"},
            {"title": "How We Grew Our Taco Business to $1M", "channel": "SmallBizSuccess", "views": 1_800_000, "likes": 67_000, "duration": "0:58"},
            {"title": "Street Tacos That Will Change Your Life", "channel": "TasteExplorers", "views": 3_100_000, "likes": 124_000, "duration": "0:35"},
            {"title": "Food Truck Marketing That Actually Works", "channel": "MarketingPros", "views": 890_000, "likes": 45_000, "duration": "0:51"},
            {"title": "Taco Tuesday Gone Viral - Our Story", "channel": "TacoLoco", "views": 1_200_000, "likes": 56_000, "duration": "0:39"}
        ],
        "patterns_identified": {
            "common_hooks": [
                "Question opener: 'Craving something different?'",
                "Bold claim: 'The best tacos you'll ever taste'",
                "Social proof: 'Over 10,000 customers can't be wrong'",
                "Scarcity: 'Only here until 3pm'",
                "Curiosity: 'What makes our salsa so addictive?'"
            ],
            "successful_structures": [
                "Hook (0-3s) -> Problem (3-8s) -> Product (8-25s) -> Social Proof (25-35s) -> CTA (35-45s)",
                "Customer testimonial montage with upbeat music",
                "Behind-the-scenes 'making of' with founder voiceover"
            ],
            "visual_styles": [
                "Close-up food shots with steam/sizzle",
                "Bright, warm color grading",
                "Quick cuts (2-3 second shots)",
                "Hand-held camera for authenticity"
            ],
            "audio_patterns": [
                "Upbeat acoustic music",
                "Natural ambient sounds (sizzling, chopping)",
                "Enthusiastic but authentic voiceover"
            ],
            "effective_ctas": [
                "Find us at [location]",
                "Follow us for daily specials",
                "Visit us today - you won't regret it"
            ]
        },
        "avg_video_length_seconds": 43,
        "recommended_approach": {
            "style": "testimonial_with_food_shots",
            "tone": "warm_authentic_enthusiastic",
            "duration": 45
        },
        "competitor_insights": [
            "Most successful ads feature real customers, not actors",
            "Authenticity beats production value",
            "Location mention in first 10 seconds increases local engagement"
        ]
    })
});

static FITNESS_RESEARCH: Lazy<Value> = Lazy::new(|| {
    json!({
        "industry": "fitness",
        "product": "fitness app",
        "top_videos": [
            {"title": "This App Changed My Life - 30 Day Transformation", "channel": "FitLife", "views": 5_200_000, "likes": 210_000, "duration": "0:52"}
        ],
        "patterns_identified": {
            "common_hooks": [
                "Transformation reveal",
                "Before/after comparison",
                "'I used to hate working out...'"
            ],
            "visual_styles": ["High energy, fast cuts", "Split screen transformations", "Workout montages"]
        },
        "recommended_approach": {
            "style": "transformation_story",
            "tone": "motivational_energetic",
            "duration": 45
        }
    })
});

static TECH_RESEARCH: Lazy<Value> = Lazy::new(|| {
    json!({
        "industry": "tech",
        "product": "saas product",
        "top_videos": [
            {"title": "How We 10x'd Productivity with One Tool", "channel": "TechReview", "views": 1_800_000, "likes": 78_000, "duration": "0:48"}
        ],
        "patterns_identified": {
            "common_hooks": ["Problem-focused opener", "Statistics/data point", "'What if I told you...'"],
            "visual_styles": ["Clean, minimal UI recordings", "Animated graphics", "Professional studio lighting"]
        },
        "recommended_approach": {
            "style": "problem_solution_demo",
            "tone": "professional_confident",
            "duration": 60
        }
    })
});

/// 按行业挑选替身调研数据，并写入请求里的行业与产品
pub fn dummy_research(request: &CampaignRequest) -> Value {
    let template = match request.industry.to_lowercase().as_str() {
        "fitness" => &*FITNESS_RESEARCH,
        "tech" | "technology" => &*TECH_RESEARCH,
        _ => &*FOOD_RESEARCH,
    };
    let mut data = template.clone();
    if let Some(obj) = data.as_object_mut() {
        obj.insert("industry".into(), json!(request.industry));
        obj.insert("product".into(), json!(request.product));
        obj.insert("placeholder".into(), json!(true));
    }
    data
}

/// 从替身调研数据推出的趋势分析
pub fn dummy_trends(request: &CampaignRequest) -> Value {
    let research = dummy_research(request);
    let hooks: Vec<Value> = research
        .pointer("/patterns_identified/common_hooks")
        .and_then(Value::as_array)
        .map(|hooks| hooks.iter().take(3).cloned().collect())
        .unwrap_or_default();
    json!({
        "viral_patterns": hooks,
        "recommended_hooks": ["Authenticity wins", "Show the product", "Clear CTA"],
        "placeholder": true
    })
}

pub fn dummy_locations(request: &CampaignRequest) -> Value {
    let city = request.city.as_deref().unwrap_or(DEFAULT_CITY);
    json!({
        "locations": [{"name": "Downtown", "address": city}],
        "city": city,
        "placeholder": true
    })
}

pub fn research_stub() -> StubFn {
    stub_from_fn(dummy_research)
}

pub fn trends_stub() -> StubFn {
    stub_from_fn(dummy_trends)
}

pub fn locations_stub() -> StubFn {
    stub_from_fn(dummy_locations)
}

/// 样例视频，替代付费的视频生成
pub fn sample_video_stub(video_path: Option<String>) -> StubFn {
    stub_from_fn(move |request| {
        json!({
            "status": "placeholder_mode",
            "enabled": video_path.is_some(),
            "video_path": video_path,
            "duration": request.duration_secs,
            "cost_estimate": 0.0,
            "note": "sample media in place of generated video"
        })
    })
}

/// 样例配乐，替代付费的音乐生成
pub fn sample_music_stub(music_path: Option<String>) -> StubFn {
    stub_from_fn(move |request| {
        json!({
            "status": "mock_mode",
            "enabled": music_path.is_some(),
            "audio_path": music_path,
            "duration": request.duration_secs,
            "format": "mp3",
            "cost_estimate": 0.0
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(industry: &str) -> CampaignRequest {
        CampaignRequest::builder("corner gym")
            .industry(industry)
            .build()
            .unwrap()
    }

    #[test]
    fn research_stub_is_parameterized_by_request() {
        let data = dummy_research(&request("fitness"));
        assert_eq!(data["product"], "corner gym");
        assert_eq!(data["industry"], "fitness");
        assert_eq!(data["recommended_approach"]["style"], "transformation_story");
    }

    #[test]
    fn unknown_industry_falls_back_to_food_template() {
        let data = dummy_research(&request("plumbing"));
        assert_eq!(data["recommended_approach"]["style"], "testimonial_with_food_shots");
        assert_eq!(data["industry"], "plumbing");
    }

    #[test]
    fn trends_take_first_three_hooks() {
        let trends = dummy_trends(&request("food"));
        assert_eq!(trends["viral_patterns"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn locations_default_city() {
        let locations = dummy_locations(&request("food"));
        assert_eq!(locations["city"], DEFAULT_CITY);
    }
}
