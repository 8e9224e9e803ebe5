// 内置 step 实现

pub mod cost_estimator;
#[cfg(feature = "http-client")]
pub mod http;
pub mod script_writer;
pub mod social_media;
pub mod trend_analyzer;
mod unconfigured;

pub use cost_estimator::CostEstimatorStep;
#[cfg(feature = "http-client")]
pub use http::HttpStep;
pub use script_writer::{ScriptWriterStep, MAX_SCRIPT_DURATION_SECS};
pub use social_media::SocialMediaStep;
pub use trend_analyzer::TrendAnalyzerStep;
pub use unconfigured::UnconfiguredStep;
