pub mod env;
pub mod loader;
pub mod settings;

pub use env::EnvConfig;
pub use loader::{build_llm_client, build_registry};
pub use settings::{
    AppConfig, LlmSettings, RequestDefaults, SampleMediaSettings, StepSettings,
};
