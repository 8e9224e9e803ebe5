use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::RequestDefaults;
use crate::error::Result;
use crate::pipeline::steps::VIRAL_VIDEO_ASSEMBLER;
use crate::runtime::{PipelineRunner, ProgressSink, RunStatus};

use super::intent::{normalize_output_type, IntentExtractor};
use super::preview::{storyboard_preview, Attachment};
use super::report::{describe_degradation, DeliverySummary};

/// 平台自动发送的问候语，不当作用户请求
pub const AUTOMATED_PHRASES: &[&str] = &[
    "hi! i'm asi:one",
    "i'm here to help",
    "what can i do for you",
    "how can i assist",
    "hello! i am",
    "i can help you with",
];

pub const HELP_TEXT: &str = "I create full ad campaigns for small businesses. You get three deliverables: \
a storyboard video for development, a viral video for TikTok and Reels, and a campaign PDF \
with research, costs, and hiring guide. Just tell me about your business, like \
'Create an ad for my taco truck' or 'I need ads for my coffee shop in Boston.'";

pub const BUSY_TEXT: &str =
    "I'm still working on your previous request. I'll send the results as soon as it's done.";

/// 发给用户的一条回复
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub end_session: bool,
    pub attachments: Vec<Attachment>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// 本轮会话的最后一条回复
    pub fn closing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_session: true,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// 聊天消息的发送通道
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, recipient: &str, reply: ChatReply) -> Result<()>;
}

/// 一条消息的处理结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    Ignored,
    Help,
    NeedsInfo,
    Busy,
    Completed(RunStatus),
    Failed,
}

/// 把进度文案转发成聊天消息
struct ChatProgress<'a> {
    sink: &'a dyn ChatSink,
    recipient: &'a str,
}

#[async_trait]
impl<'a> ProgressSink for ChatProgress<'a> {
    async fn notify(&self, step: &str, label: &str) {
        if let Err(err) = self.sink.send(self.recipient, ChatReply::text(label)).await {
            warn!(step, error = %err, "could not send progress update");
        }
    }
}

struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<String>>,
    sender: String,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.sender);
    }
}

/// 聊天入口：识别需求、运行流水线、回复结果
pub struct ChatOrchestrator {
    runner: PipelineRunner,
    extractor: IntentExtractor,
    defaults: RequestDefaults,
    quick_full: bool,
    busy: Mutex<HashSet<String>>,
}

impl ChatOrchestrator {
    pub fn new(runner: PipelineRunner, extractor: IntentExtractor) -> Self {
        Self {
            runner,
            extractor,
            defaults: RequestDefaults::default(),
            quick_full: false,
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// 所有请求都改走跳过调研的 quick_full
    pub fn with_quick_full(mut self, enabled: bool) -> Self {
        self.quick_full = enabled;
        self
    }

    pub fn is_busy(&self, sender: &str) -> bool {
        self.busy.lock().contains(sender)
    }

    fn try_acquire(&self, sender: &str) -> Option<BusyGuard<'_>> {
        if !self.busy.lock().insert(sender.to_string()) {
            return None;
        }
        Some(BusyGuard {
            busy: &self.busy,
            sender: sender.to_string(),
        })
    }

    async fn reply(&self, sink: &dyn ChatSink, sender: &str, reply: ChatReply) {
        if let Err(err) = sink.send(sender, reply).await {
            warn!(sender, error = %err, "could not send reply");
        }
    }

    pub async fn handle(&self, sender: &str, text: &str, sink: &dyn ChatSink) -> HandleOutcome {
        let mut text = text.trim();
        if text.is_empty() {
            return HandleOutcome::Ignored;
        }
        let lower = text.to_lowercase();
        if AUTOMATED_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            info!(sender, "ignoring automated greeting");
            return HandleOutcome::Ignored;
        }
        if text.starts_with("@agent") {
            if let Some(idx) = text.find(' ') {
                text = text[idx..].trim();
            }
        }

        let intent = self.extractor.extract(text).await;
        if !intent.is_ad_request {
            self.reply(sink, sender, ChatReply::text(HELP_TEXT)).await;
            return HandleOutcome::Help;
        }
        if !intent.ready {
            let missing = if intent.missing.is_empty() {
                "some details".to_string()
            } else {
                intent.missing.join(", ")
            };
            self.reply(
                sink,
                sender,
                ChatReply::text(format!(
                    "Almost there! I still need: {}\n\nPlease provide the missing info.",
                    missing
                )),
            )
            .await;
            return HandleOutcome::NeedsInfo;
        }

        let Some(_guard) = self.try_acquire(sender) else {
            self.reply(sink, sender, ChatReply::text(BUSY_TEXT)).await;
            return HandleOutcome::Busy;
        };

        let output_type = normalize_output_type(intent.output_type.as_deref(), text, self.quick_full);
        let request = match intent.to_request(&output_type, &self.defaults) {
            Ok(request) => request,
            Err(err) => {
                self.reply(
                    sink,
                    sender,
                    ChatReply::closing(format!("Sorry, I encountered an error: {}\n\nPlease try again.", err)),
                )
                .await;
                return HandleOutcome::Failed;
            }
        };

        let city_part = request
            .city
            .as_deref()
            .map(|city| format!(" in {}", city))
            .unwrap_or_default();
        let has_viral = self
            .runner
            .registry()
            .definition(&output_type)
            .map(|definition| definition.contains(VIRAL_VIDEO_ASSEMBLER))
            .unwrap_or(false);
        let kickoff = if has_viral {
            format!(
                "Got it. I'm putting together your ad campaign for {}{}: a silent storyboard video for \
                 development, a ready-to-post viral video, and the full campaign PDF. This takes several \
                 minutes. I'll check in as I go.",
                request.product, city_part
            )
        } else {
            format!(
                "Got it. I'm putting together your storyboard package for {}{}: the concept video and \
                 campaign PDF. This takes a few minutes. I'll check in as I go.",
                request.product, city_part
            )
        };
        self.reply(sink, sender, ChatReply::text(kickoff)).await;

        let progress = ChatProgress {
            sink,
            recipient: sender,
        };
        let result = match self
            .runner
            .run_pipeline(&output_type, &request, Some(&progress))
            .await
        {
            Ok(result) => result,
            Err(err) => {
                error!(sender, output_type = %output_type, error = %err, "pipeline could not start");
                self.reply(
                    sink,
                    sender,
                    ChatReply::closing(format!(
                        "Sorry, something went wrong: {}\n\nPlease try again or simplify your request.",
                        err
                    )),
                )
                .await;
                return HandleOutcome::Failed;
            }
        };

        let summary = DeliverySummary::from_results(&result.results);
        let mut text = summary.text();
        if let Some(note) = describe_degradation(&result.errors, &result.results) {
            text.push_str("\n\n");
            text.push_str(&note);
        }

        let mut reply = ChatReply::closing(text.clone());
        if let Some(preview) = storyboard_preview(&result.results) {
            reply = reply.with_attachment(preview);
        }
        let had_attachments = !reply.attachments.is_empty();
        if let Err(err) = sink.send(sender, reply).await {
            error!(sender, error = %err, "failed to send results");
            if had_attachments {
                self.reply(sink, sender, ChatReply::closing(text)).await;
            }
        }

        info!(sender, pipeline = %result.pipeline, status = ?result.status, "request handled");
        HandleOutcome::Completed(result.status)
    }
}
