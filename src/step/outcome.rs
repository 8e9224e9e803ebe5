use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AdboardError, Result};

/// step 失败类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 网络、限流等临时问题，跳过后继续
    Transient,
    /// 缺少凭证或必要输入，跳过后继续
    Configuration,
    /// 终止整个运行
    Fatal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Configuration => "configuration",
            FailureKind::Fatal => "fatal",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FailureKind::Fatal)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl StepFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<AdboardError> for StepFailure {
    fn from(err: AdboardError) -> Self {
        let kind = match err {
            AdboardError::Config(_) | AdboardError::InvalidRequest(_) => FailureKind::Configuration,
            _ => FailureKind::Transient,
        };
        StepFailure::new(kind, err.to_string())
    }
}

/// step 执行结果
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Success(Value),
    Failure(StepFailure),
}

impl StepOutcome {
    pub fn success(payload: Value) -> Self {
        StepOutcome::Success(payload)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        StepOutcome::Failure(StepFailure::new(FailureKind::Transient, message))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        StepOutcome::Failure(StepFailure::new(FailureKind::Configuration, message))
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        StepOutcome::Failure(StepFailure::new(FailureKind::Fatal, message))
    }

    /// 把内部 `?` 风格的结果转换成 outcome
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(payload) => StepOutcome::Success(payload),
            Err(err) => StepOutcome::Failure(err.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            StepOutcome::Failure(failure) => Some(failure),
            StepOutcome::Success(_) => None,
        }
    }
}
