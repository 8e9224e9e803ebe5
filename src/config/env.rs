use crate::error::{AdboardError, Result};
use crate::pipeline::steps::CONDITION_SAMPLE_MEDIA;
use crate::pipeline::RunConditions;
use crate::utils::logging::DEBUG_ENV;
use std::env;

pub const QUICK_FULL_ENV: &str = "ADBOARD_QUICK_FULL";
pub const SAMPLE_MEDIA_ENV: &str = "ADBOARD_SAMPLE_MEDIA";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 获取 API Key，支持从环境变量或配置中获取
    ///
    /// 优先级：
    /// 1. 直接写在配置里的值（不以 ${} 包裹）
    /// 2. 环境变量（值为 ${VAR_NAME} 格式）
    /// 3. 配置为空时读取 `default_env_var`
    pub fn get_api_key(api_key: &str, default_env_var: &str) -> Result<String> {
        if let Some(name) = Self::env_reference(api_key) {
            Self::get_env(name)
        } else if api_key.is_empty() {
            Self::get_env(default_env_var)
        } else {
            Ok(api_key.to_string())
        }
    }

    /// 解析可能以 `${VAR}` 形式引用环境变量的配置值
    pub fn resolve(value: &str) -> Result<String> {
        match Self::env_reference(value) {
            Some(name) => Self::get_env(name),
            None => Ok(value.to_string()),
        }
    }

    pub fn env_reference(value: &str) -> Option<&str> {
        value
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|name| !name.is_empty())
    }

    /// 从环境变量获取值
    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| {
            AdboardError::Config(format!("environment variable `{}` is not set", key))
        })
    }

    /// 获取可选的环境变量
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok()
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }

    /// 聊天入口把视频类请求改为跳过调研的 quick_full
    pub fn quick_full_enabled() -> bool {
        Self::flag(QUICK_FULL_ENV)
    }

    /// 用样例素材代替付费的视频和音乐生成
    pub fn sample_media_enabled() -> bool {
        Self::flag(SAMPLE_MEDIA_ENV)
    }

    /// 由环境变量得到的运行条件
    pub fn run_conditions() -> RunConditions {
        let mut conditions = RunConditions::new();
        if Self::sample_media_enabled() {
            conditions.insert(CONDITION_SAMPLE_MEDIA);
        }
        conditions
    }

    fn flag(key: &str) -> bool {
        Self::get_env_optional(key)
            .map(|value| parse_flag(&value))
            .unwrap_or(false)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_api_key_direct() {
        let result = EnvConfig::get_api_key("sk-1234567890abcdef1234567890", "ADBOARD_TEST_KEY");
        assert_eq!(result.unwrap(), "sk-1234567890abcdef1234567890");
    }

    #[test]
    fn test_get_api_key_env_var() {
        env::set_var("ADBOARD_TEST_LLM_KEY", "test_key_value");
        let result = EnvConfig::get_api_key("${ADBOARD_TEST_LLM_KEY}", "FALLBACK_KEY");
        assert_eq!(result.unwrap(), "test_key_value");
        env::remove_var("ADBOARD_TEST_LLM_KEY");
    }

    #[test]
    fn test_missing_env_var_is_config_error() {
        let result = EnvConfig::resolve("${ADBOARD_TEST_DEFINITELY_UNSET}");
        assert!(matches!(result, Err(AdboardError::Config(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
