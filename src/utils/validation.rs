use crate::error::{AdboardError, Result};

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证 API Key 格式
    pub fn validate_api_key(api_key: &str) -> Result<()> {
        if api_key.is_empty() {
            return Err(AdboardError::Config("api key must not be empty".into()));
        }

        if api_key.starts_with("your_") || api_key.starts_with("sk-") && api_key.len() < 20 {
            return Err(AdboardError::Config(
                "api key looks like a placeholder".into(),
            ));
        }

        Ok(())
    }

    /// 验证 URL 格式
    pub fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(AdboardError::Config("url must not be empty".into()));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AdboardError::Config(format!(
                "url `{}` must start with http:// or https://",
                url
            )));
        }

        Ok(())
    }

    /// 验证 step 标识：只允许小写字母、数字和下划线
    pub fn validate_step_id(step: &str) -> Result<()> {
        if step.is_empty() {
            return Err(AdboardError::Config("step id must not be empty".into()));
        }

        if !step
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(AdboardError::Config(format!(
                "step id `{}` may only contain lowercase letters, digits and underscores",
                step
            )));
        }

        Ok(())
    }

    /// 验证流水线名称
    pub fn validate_pipeline_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AdboardError::Config("pipeline name must not be empty".into()));
        }

        if name.len() > 100 {
            return Err(AdboardError::Config(format!(
                "pipeline name `{}` is longer than 100 characters",
                name
            )));
        }

        Ok(())
    }

    /// 验证温度参数
    pub fn validate_temperature(temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AdboardError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }
        Ok(())
    }
}
