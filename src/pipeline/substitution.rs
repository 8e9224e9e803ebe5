use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::campaign::CampaignRequest;

/// 生成替身数据的函数
pub type StubFn = Arc<dyn Fn(&CampaignRequest) -> Value + Send + Sync>;

/// 固定替身值
pub fn stub_static(value: Value) -> StubFn {
    Arc::new(move |_| value.clone())
}

/// 由请求参数计算的替身值
pub fn stub_from_fn<F>(func: F) -> StubFn
where
    F: Fn(&CampaignRequest) -> Value + Send + Sync + 'static,
{
    Arc::new(func)
}

/// 本次运行启用的外部条件，例如 `sample_media`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunConditions {
    active: BTreeSet<String>,
}

impl RunConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: impl Into<String>) -> Self {
        self.active.insert(condition.into());
        self
    }

    pub fn insert(&mut self, condition: impl Into<String>) {
        self.active.insert(condition.into());
    }

    pub fn is_active(&self, condition: &str) -> bool {
        self.active.contains(condition)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RunConditions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubstitutionCondition {
    Always,
    When(String),
}

/// 用替身数据代替真实 step 调用
///
/// 不改变流水线顺序，只决定该 step 的 adapter 是否被调用。
#[derive(Clone)]
pub struct Substitution {
    pub step: String,
    pub condition: SubstitutionCondition,
    stub: StubFn,
}

impl Substitution {
    pub fn always(step: impl Into<String>, stub: StubFn) -> Self {
        Self {
            step: step.into(),
            condition: SubstitutionCondition::Always,
            stub,
        }
    }

    pub fn when(condition: impl Into<String>, step: impl Into<String>, stub: StubFn) -> Self {
        Self {
            step: step.into(),
            condition: SubstitutionCondition::When(condition.into()),
            stub,
        }
    }

    pub fn applies(&self, conditions: &RunConditions) -> bool {
        match &self.condition {
            SubstitutionCondition::Always => true,
            SubstitutionCondition::When(name) => conditions.is_active(name),
        }
    }

    pub fn stub_value(&self, request: &CampaignRequest) -> Value {
        (self.stub)(request)
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitution")
            .field("step", &self.step)
            .field("condition", &self.condition)
            .finish()
    }
}
