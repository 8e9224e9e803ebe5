//! 制作成本估算

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::campaign::CampaignRequest;
use crate::llm::{extract_json, DynLlmClient, LlmRequest};
use crate::pipeline::steps::{COST_ESTIMATOR, SCRIPT_WRITER};
use crate::state::ResultMap;
use crate::step::{StepAdapter, StepOutcome};

const CONTINGENCY_RATE: f64 = 0.15;

pub struct CostEstimatorStep {
    llm: DynLlmClient,
}

impl CostEstimatorStep {
    pub fn new(llm: DynLlmClient) -> Self {
        Self { llm }
    }
}

/// 模型没有给出可用预算时的默认估算：两名演员、一个场地、半天拍摄
pub fn default_estimate() -> Value {
    let breakdown = [
        ("talent", 400u64),
        ("locations", 300),
        ("equipment", 400),
        ("props_wardrobe", 150),
        ("food_craft", 100),
        ("post_production", 500),
    ];
    let subtotal: u64 = breakdown.iter().map(|(_, cost)| cost).sum();
    let contingency = (subtotal as f64 * CONTINGENCY_RATE) as u64;

    let mut items = serde_json::Map::new();
    for (name, cost) in breakdown {
        items.insert(name.to_string(), json!(cost));
    }
    items.insert("contingency".into(), json!(contingency));

    json!({
        "total": subtotal + contingency,
        "breakdown": items,
        "assumptions": [
            "1-2 non-union actors",
            "1 location, half-day shoot",
            "Basic equipment package",
            "Simple post-production"
        ],
        "budget_level": "low",
        "shoot_days": 1,
        "crew_size": 4,
        "actor_count": 2,
        "tips": [
            "Use natural lighting to reduce equipment costs",
            "Film at your actual business location (free)",
            "Ask friends/family to appear as extras"
        ]
    })
}

fn build_prompt(request: &CampaignRequest, scenes: &[Value]) -> String {
    let summary: String = scenes
        .iter()
        .map(|scene| {
            format!(
                "Scene {}: {}\n",
                scene["scene_number"],
                scene["visual"].as_str().unwrap_or("")
            )
        })
        .collect();
    let market = request.city.as_deref().unwrap_or("a mid-size US city");

    format!(
        "You are a video production cost estimator. Estimate the budget for filming this ad.\n\n\
         Product: {product}\nDuration: {duration} seconds\nScene count: {count}\n\n\
         Scenes:\n{summary}\n\
         Use realistic rates for {market}, non-union talent and indie production level.\n\
         Return ONLY a JSON object with total, breakdown (talent, locations, equipment, \
         props_wardrobe, food_craft, post_production, contingency), assumptions, budget_level, \
         shoot_days, crew_size, actor_count and tips.",
        product = request.product,
        duration = request.duration_secs,
        count = scenes.len(),
        summary = summary,
        market = market,
    )
}

#[async_trait]
impl StepAdapter for CostEstimatorStep {
    fn name(&self) -> &str {
        COST_ESTIMATOR
    }

    async fn execute(&self, request: &CampaignRequest, results: &ResultMap) -> StepOutcome {
        let scenes = results
            .field(SCRIPT_WRITER, "scenes")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let prompt = LlmRequest::new(build_prompt(request, &scenes))
            .with_temperature(0.2)
            .with_max_tokens(1000);
        match self.llm.complete(prompt).await {
            Ok(response) => match extract_json(&response.content) {
                Some(estimate) if estimate.is_object() => StepOutcome::success(estimate),
                _ => StepOutcome::success(default_estimate()),
            },
            Err(err) => {
                warn!(step = COST_ESTIMATOR, error = %err, "llm unavailable, using default estimate");
                StepOutcome::success(json!({
                    "error": err.to_string(),
                    "fallback": default_estimate(),
                }))
            }
        }
    }
}
