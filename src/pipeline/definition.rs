use super::substitution::{RunConditions, Substitution};

/// 具名、有序的 step 列表
///
/// 顺序是唯一的依赖信号：后面的 step 读取前面 step 写入结果表的数据。
#[derive(Clone, Debug)]
pub struct PipelineDefinition {
    pub name: String,
    pub steps: Vec<String>,
    pub substitutions: Vec<Substitution>,
}

impl PipelineDefinition {
    pub fn new<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(Into::into).collect(),
            substitutions: Vec::new(),
        }
    }

    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitutions.push(substitution);
        self
    }

    pub fn contains(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s == step)
    }

    pub fn position(&self, step: &str) -> Option<usize> {
        self.steps.iter().position(|s| s == step)
    }

    /// 当前条件下该 step 生效的替身；多个同时生效时取先声明的那个
    pub fn active_substitution(
        &self,
        step: &str,
        conditions: &RunConditions,
    ) -> Option<&Substitution> {
        self.substitutions
            .iter()
            .find(|sub| sub.step == step && sub.applies(conditions))
    }
}
