// 运行时模块 - 顺序执行流水线

mod executor;
mod progress;
mod run;
mod types;

pub use crate::pipeline::RunConditions;
pub use executor::PipelineRunner;
pub use progress::{FnProgress, ProgressSink};
pub use run::PipelineRun;
pub use types::{
    PipelineRunResult, RunPhase, RunStatus, StepDisposition, StepError, StepTrace,
};
