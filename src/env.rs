//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量管理

use std::env;
use std::fmt;
use std::time::Duration;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 只在变量被显式设置时返回值
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "RWB_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 分词换行相关环境变量
pub mod word_break {
    use super::*;

    /// 配置文件路径
    pub struct ConfigPath;
    impl EnvVar<String> for ConfigPath {
        const NAME: &'static str = "RWB_CONFIG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path to a TOML or JSON word break config file";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path must not be empty".to_string(),
                });
            }
            Ok(value.trim().to_string())
        }
    }

    /// 每批处理的文本单元数
    pub struct BatchSize;
    impl EnvVar<usize> for BatchSize {
        const NAME: &'static str = "RWB_BATCH_SIZE";
        const DEFAULT: Option<usize> = Some(10);
        const DESCRIPTION: &'static str = "Text units processed per batch";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1000)
        }
    }

    /// 批次间延迟
    pub struct BatchDelay;
    impl EnvVar<Duration> for BatchDelay {
        const NAME: &'static str = "RWB_BATCH_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(10));
        const DESCRIPTION: &'static str = "Pause between batches in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_millis(value, Self::NAME, 0, 5_000)
        }
    }

    /// 单个文本单元的最大字符数
    pub struct MaxTextLength;
    impl EnvVar<usize> for MaxTextLength {
        const NAME: &'static str = "RWB_MAX_TEXT_LENGTH";
        const DEFAULT: Option<usize> = Some(1000);
        const DESCRIPTION: &'static str =
            "Longer text units are marked processed without segmentation";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 1_000_000)
        }
    }

    /// 整体运行时间预算
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "RWB_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Wall-clock budget of a single run in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_millis(value, Self::NAME, 1, 3_600_000)
        }
    }

    /// 变更去抖窗口
    pub struct Debounce;
    impl EnvVar<Duration> for Debounce {
        const NAME: &'static str = "RWB_DEBOUNCE_MS";
        const DEFAULT: Option<Duration> = Some(Duration::from_millis(100));
        const DESCRIPTION: &'static str = "Mutation debounce window in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_millis(value, Self::NAME, 0, 10_000)
        }
    }

    /// 目标容器选择器
    pub struct TargetSelectors;
    impl EnvVar<String> for TargetSelectors {
        const NAME: &'static str = "RWB_TARGET_SELECTORS";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "Comma-separated simple selectors limiting processed subtrees (default: body)";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Selector list must not be empty".to_string(),
                });
            }
            Ok(value.trim().to_string())
        }
    }
}

/// 辅助函数
fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_millis(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<Duration> {
    let millis: u64 = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of milliseconds".to_string(),
    })?;

    if millis < min || millis > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} outside allowed range {}..={}", millis, min, max),
        });
    }

    Ok(Duration::from_millis(millis))
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    docs.push_str(&format!(
        "- `{}`: {}\n",
        self::core::LogLevel::NAME,
        self::core::LogLevel::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        self::core::NoColor::NAME,
        self::core::NoColor::DESCRIPTION,
        self::core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Word Break\n\n");
    docs.push_str(&format!(
        "- `{}`: {}\n",
        word_break::ConfigPath::NAME,
        word_break::ConfigPath::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        word_break::BatchSize::NAME,
        word_break::BatchSize::DESCRIPTION,
        word_break::BatchSize::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        word_break::BatchDelay::NAME,
        word_break::BatchDelay::DESCRIPTION,
        word_break::BatchDelay::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        word_break::MaxTextLength::NAME,
        word_break::MaxTextLength::DESCRIPTION,
        word_break::MaxTextLength::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        word_break::Timeout::NAME,
        word_break::Timeout::DESCRIPTION,
        word_break::Timeout::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        word_break::Debounce::NAME,
        word_break::Debounce::DESCRIPTION,
        word_break::Debounce::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        word_break::TargetSelectors::NAME,
        word_break::TargetSelectors::DESCRIPTION
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(super::core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(super::core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(word_break::BatchSize::parse("5").unwrap(), 5);
        assert!(word_break::BatchSize::parse("0").is_err());
        assert!(word_break::BatchSize::parse("ten").is_err());
        assert!(word_break::MaxTextLength::parse("2000000").is_err());
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(
            word_break::BatchDelay::parse("50").unwrap(),
            Duration::from_millis(50)
        );
        assert_eq!(word_break::Debounce::parse("0").unwrap(), Duration::ZERO);
        assert!(word_break::Timeout::parse("0").is_err());
        assert!(word_break::Timeout::parse("-1").is_err());
    }

    #[test]
    fn test_selector_must_not_be_blank() {
        assert!(word_break::TargetSelectors::parse("   ").is_err());
        assert_eq!(
            word_break::TargetSelectors::parse(" .entry-content ").unwrap(),
            ".entry-content"
        );
    }

    #[test]
    fn test_docs_list_every_variable() {
        let docs = generate_env_docs();
        for name in [
            "RWB_LOG_LEVEL",
            "RWB_CONFIG",
            "RWB_BATCH_SIZE",
            "RWB_BATCH_DELAY_MS",
            "RWB_MAX_TEXT_LENGTH",
            "RWB_TIMEOUT_MS",
            "RWB_DEBOUNCE_MS",
            "RWB_TARGET_SELECTORS",
        ] {
            assert!(docs.contains(name), "missing {}", name);
        }
    }
}
