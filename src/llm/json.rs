use serde_json::Value;

/// 从模型回答里取出 JSON
///
/// 依次尝试：整段解析、```json 围栏、第一个 `{` 到最后一个 `}` 之间的内容。
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Some(value);
        }
    }

    if let Some(fenced) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(fenced.trim()) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // 跳过语言标记，例如 ```json
    let body_start = after_fence.find('\n').map(|idx| idx + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_json() {
        assert_eq!(extract_json(r#"{"a": 1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn parses_fenced_json() {
        let text = "Here you go:\n```json\n{\"scenes\": []}\n```\nEnjoy";
        assert_eq!(extract_json(text), Some(json!({"scenes": []})));
    }

    #[test]
    fn parses_embedded_object() {
        let text = "Sure! {\"total\": 10} hope that helps";
        assert_eq!(extract_json(text), Some(json!({"total": 10})));
    }

    #[test]
    fn rejects_prose() {
        assert_eq!(extract_json("no structured answer here"), None);
        assert_eq!(extract_json("\"just a string\""), None);
    }
}
