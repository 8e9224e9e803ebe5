use serde::{Deserialize, Serialize};

use crate::error::{AdboardError, Result};

use super::tone::Tone;

pub const DEFAULT_DURATION_SECS: u32 = 45;
pub const DEFAULT_OUTPUT_TYPE: &str = "full_campaign";

/// 一次流水线运行的输入，创建后不再修改
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub product: String,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub duration_secs: u32,
    #[serde(default)]
    pub tone: Tone,
    pub output_type: String,
}

impl CampaignRequest {
    pub fn builder(product: impl Into<String>) -> CampaignRequestBuilder {
        CampaignRequestBuilder::new(product)
    }

    /// 城市，未指定时为空字符串
    pub fn city_or_empty(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }

    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(AdboardError::InvalidRequest(
                "product must not be empty".to_string(),
            ));
        }
        if self.duration_secs == 0 {
            return Err(AdboardError::InvalidRequest(
                "duration must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct CampaignRequestBuilder {
    product: String,
    industry: String,
    city: Option<String>,
    duration_secs: u32,
    tone: Tone,
    output_type: String,
}

impl CampaignRequestBuilder {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            industry: "general".to_string(),
            city: None,
            duration_secs: DEFAULT_DURATION_SECS,
            tone: Tone::default(),
            output_type: DEFAULT_OUTPUT_TYPE.to_string(),
        }
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        let city = city.into();
        self.city = if city.trim().is_empty() { None } else { Some(city) };
        self
    }

    pub fn duration_secs(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn tone(mut self, tone: impl Into<Tone>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    pub fn build(self) -> Result<CampaignRequest> {
        let request = CampaignRequest {
            product: self.product,
            industry: self.industry,
            city: self.city,
            duration_secs: self.duration_secs,
            tone: self.tone,
            output_type: self.output_type,
        };
        request.validate()?;
        Ok(request)
    }
}
