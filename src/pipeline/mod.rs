// 流水线模块 - 流水线定义、注册表与替身数据

pub mod builtin;
pub mod steps;
pub mod stubs;

mod definition;
mod registry;
mod substitution;

pub use builtin::{register_standard_pipelines, standard_pipelines, SampleMedia, PROGRESS_LABELS};
pub use definition::PipelineDefinition;
pub use registry::{PipelineRegistry, PipelineRegistryBuilder};
pub use substitution::{
    stub_from_fn, stub_static, RunConditions, StubFn, Substitution, SubstitutionCondition,
};
