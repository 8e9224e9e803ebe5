//! 聊天接入层：把自然语言消息变成流水线请求，并把结果写回给用户

pub mod intent;
pub mod orchestrator;
pub mod preview;
pub mod report;

pub use intent::{extract_intent_simple, normalize_output_type, CampaignIntent, IntentExtractor};
pub use orchestrator::{ChatOrchestrator, ChatReply, ChatSink, HandleOutcome};
pub use preview::{storyboard_preview, Attachment};
pub use report::{describe_degradation, DeliverySummary};
