// Step 契约模块：所有外部能力统一的调用接口

mod adapter;
mod outcome;
mod registry;

pub use adapter::StepAdapter;
pub use outcome::{FailureKind, StepFailure, StepOutcome};
pub use registry::{StepPolicy, StepRegistry};
