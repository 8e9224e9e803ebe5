pub mod adapters;
pub mod campaign;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod runtime;
pub mod state;
pub mod step;
pub mod utils;

pub use campaign::{CampaignRequest, CampaignRequestBuilder, Tone};
pub use chat::{ChatOrchestrator, ChatReply, ChatSink, IntentExtractor};
pub use config::{build_registry, AppConfig, EnvConfig};
pub use error::{AdboardError, Result};
pub use llm::{DynLlmClient, LlmClient, LlmRequest, LlmResponse, LocalEchoClient};
#[cfg(feature = "http-client")]
pub use llm::OpenAiCompatClient;
pub use pipeline::{
    stub_from_fn, stub_static, PipelineDefinition, PipelineRegistry, PipelineRegistryBuilder,
    RunConditions, Substitution, SubstitutionCondition,
};
pub use runtime::{
    FnProgress, PipelineRunResult, PipelineRunner, ProgressSink, RunStatus, StepDisposition,
    StepError, StepTrace,
};
pub use state::ResultMap;
pub use step::{FailureKind, StepAdapter, StepFailure, StepOutcome, StepPolicy, StepRegistry};
pub use utils::{logging, validation};
