// 营销活动请求模块

mod request;
mod tone;

pub use request::{CampaignRequest, CampaignRequestBuilder, DEFAULT_DURATION_SECS, DEFAULT_OUTPUT_TYPE};
pub use tone::Tone;
