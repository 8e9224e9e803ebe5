use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// 单次运行的结果表
///
/// 按插入顺序保存 step 输出，只增不删。写入只在 crate 内部进行，
/// step 只能拿到 `&ResultMap`。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultMap {
    entries: Vec<(String, Value)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, step: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == step)
            .map(|(_, value)| value)
    }

    /// 读取某个 step 输出里的字段
    pub fn field(&self, step: &str, field: &str) -> Option<&Value> {
        self.get(step).and_then(|value| value.get(field))
    }

    /// step 存在且其输出没有 `error` 字段
    pub fn has_usable(&self, step: &str) -> bool {
        matches!(self.get(step), Some(value) if value.get("error").is_none())
    }

    pub fn contains(&self, step: &str) -> bool {
        self.get(step).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 写入 step 输出。step 标识在一个流水线内唯一，重复写入说明调用方有 bug。
    pub(crate) fn insert(&mut self, step: impl Into<String>, value: Value) {
        let step = step.into();
        debug_assert!(!self.contains(&step), "step `{step}` written twice");
        if !self.contains(&step) {
            self.entries.push((step, value));
        }
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
