use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdboardError>;

#[derive(Debug, Error)]
pub enum AdboardError {
    #[error("pipeline `{0}` not registered")]
    UnknownPipeline(String),
    #[error("step `{0}` not registered")]
    UnknownStep(String),
    #[error("pipeline `{pipeline}` lists step `{step}` more than once")]
    DuplicateStep { pipeline: String, step: String },
    #[error("pipeline `{pipeline}` runs `{step}` before its dependency `{dependency}`")]
    DependencyOrder {
        pipeline: String,
        step: String,
        dependency: String,
    },
    #[error("pipeline `{pipeline}` substitutes `{step}`, which is not one of its steps")]
    InvalidSubstitution { pipeline: String, step: String },
    #[error("pipeline `{0}` has no steps")]
    EmptyPipeline(String),
    #[error("invalid campaign request: {0}")]
    InvalidRequest(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("llm error: {0}")]
    Llm(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for AdboardError {
    fn from(err: serde_json::Error) -> Self {
        AdboardError::Serialization(err.to_string())
    }
}
