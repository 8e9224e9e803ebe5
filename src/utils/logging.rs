use std::env;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEBUG_ENV: &str = "ADBOARD_DEBUG";

/// 默认只看流水线开始/结束（info）和 step 失败、降级（warn）
const DEFAULT_DIRECTIVES: &str = "adboard=info,warn";
/// 调试时再打开替身数据、重试和每个 step 的结果
const DEBUG_DIRECTIVES: &str = "adboard=debug,info";

/// 日志输出到 stderr，stdout 留给 `adboard run` 的 JSON 和聊天回复
pub struct LoggingConfig;

impl LoggingConfig {
    /// 初始化日志
    ///
    /// `RUST_LOG` 优先；否则按 `ADBOARD_DEBUG` 选择 [`Self::default_directives`]。
    /// 调试模式下额外带上 target、文件、行号和线程。重复调用只有第一次生效，
    /// 测试和 CLI 都可以放心调用。
    ///
    /// ```no_run
    /// use adboard::utils::LoggingConfig;
    ///
    /// LoggingConfig::init();
    /// ```
    pub fn init() {
        let is_debug = Self::is_debug();
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::default_directives(is_debug)));

        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(is_debug)
            .with_file(is_debug)
            .with_line_number(is_debug)
            .with_thread_ids(is_debug);

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();

        if installed && is_debug {
            tracing::debug!("调试模式已启用");
        }
    }

    /// 没有设置 `RUST_LOG` 时使用的过滤规则
    pub fn default_directives(is_debug: bool) -> &'static str {
        if is_debug {
            DEBUG_DIRECTIVES
        } else {
            DEFAULT_DIRECTIVES
        }
    }

    pub fn is_debug() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }
}
